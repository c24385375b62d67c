//! Delimited-text formats, keyed by file extension

use crate::errors::{unsupported_format, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub extension: &'static str,
    pub delimiter: u8,
}

static FORMATS: [Format; 2] = [
    Format {
        extension: "csv",
        delimiter: b',',
    },
    Format {
        extension: "tsv",
        delimiter: b'\t',
    },
];

/// Look up a format by extension (case-insensitive, leading dot allowed)
pub fn format_for(extension: &str) -> Result<&'static Format> {
    let wanted = extension.trim_start_matches('.');
    FORMATS
        .iter()
        .find(|f| f.extension.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| unsupported_format(extension))
}

pub fn formats() -> &'static [Format] {
    &FORMATS
}

impl Format {
    pub(crate) fn writer<W: std::io::Write>(&self, sink: W) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(sink)
    }

    pub(crate) fn reader<R: std::io::Read>(&self, source: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(source)
    }

    /// Archive entry name for a table
    pub fn entry_name(&self, table: &str) -> String {
        format!("{}.{}", table, self.extension)
    }
}

/// Split an archive entry name `{table}.{ext}` into table and format
pub fn split_entry_name(name: &str) -> Result<(&str, &'static Format)> {
    match name.rsplit_once('.') {
        Some((table, extension)) if !table.is_empty() => Ok((table, format_for(extension)?)),
        _ => Err(unsupported_format(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldsmith_core::errors::WsErrorKind;

    #[test]
    fn test_known_formats() {
        assert_eq!(format_for("csv").unwrap().delimiter, b',');
        assert_eq!(format_for(".TSV").unwrap().delimiter, b'\t');
    }

    #[test]
    fn test_unknown_format() {
        let err = format_for("xlsx").unwrap_err();
        assert_eq!(err.kind(), WsErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_split_entry_name() {
        let (table, format) = split_entry_name("world_room.tsv").unwrap();
        assert_eq!(table, "world_room");
        assert_eq!(format.extension, "tsv");
        assert!(split_entry_name("README").is_err());
        assert!(split_entry_name(".csv").is_err());
    }
}
