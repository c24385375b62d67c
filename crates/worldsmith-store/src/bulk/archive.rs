//! tar.gz container
//!
//! Entries are written with fixed metadata (mode 0644, mtime 0) so the same
//! content always yields the same archive.

use crate::errors::{io_error, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use std::path::Path;
use tar::{Archive, Builder, EntryType, Header};

pub struct ArchiveWriter<W: Write> {
    builder: Builder<GzEncoder<W>>,
    entries: usize,
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            builder: Builder::new(GzEncoder::new(sink, Compression::default())),
            entries: 0,
        }
    }

    /// Append one regular file of `size` bytes read from `data`
    pub fn append<R: Read>(&mut self, path: &Path, size: u64, data: R) -> Result<()> {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(size);
        header.set_mode(0o644);
        header.set_mtime(0);
        self.builder
            .append_data(&mut header, path, data)
            .map_err(|e| io_error("archive_append", e))?;
        self.entries += 1;
        Ok(())
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write the tar trailer and gzip footer, returning the sink
    pub fn finish(self) -> Result<W> {
        let encoder = self
            .builder
            .into_inner()
            .map_err(|e| io_error("archive_finish", e))?;
        encoder.finish().map_err(|e| io_error("archive_finish", e))
    }
}

/// Visit every regular file entry of a tar.gz stream in archive order
pub fn for_each_entry<R, F>(source: R, mut visit: F) -> Result<()>
where
    R: Read,
    F: FnMut(&str, &mut dyn Read) -> Result<()>,
{
    let mut archive = Archive::new(GzDecoder::new(source));
    let entries = archive
        .entries()
        .map_err(|e| io_error("archive_read", e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| io_error("archive_read", e))?;
        if entry.header().entry_type() != EntryType::Regular {
            continue;
        }
        let name = entry
            .path()
            .map_err(|e| io_error("archive_read", e))?
            .to_string_lossy()
            .into_owned();
        visit(&name, &mut entry)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_read_back_in_order() {
        let mut writer = ArchiveWriter::new(Vec::new());
        writer.append(Path::new("b.csv"), 3, &b"one"[..]).unwrap();
        writer.append(Path::new("a.csv"), 3, &b"two"[..]).unwrap();
        assert_eq!(writer.entries(), 2);
        let bytes = writer.finish().unwrap();

        let mut seen = Vec::new();
        for_each_entry(&bytes[..], |name, data| {
            let mut content = String::new();
            data.read_to_string(&mut content).unwrap();
            seen.push((name.to_string(), content));
            Ok(())
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![
                ("b.csv".to_string(), "one".to_string()),
                ("a.csv".to_string(), "two".to_string())
            ]
        );
    }

    #[test]
    fn test_same_content_same_bytes() {
        let build = || {
            let mut writer = ArchiveWriter::new(Vec::new());
            writer.append(Path::new("t.csv"), 2, &b"id"[..]).unwrap();
            writer.finish().unwrap()
        };
        assert_eq!(build(), build());
    }
}
