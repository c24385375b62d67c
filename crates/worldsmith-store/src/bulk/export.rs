//! Table and dataset export
//!
//! A table exports as a header of column names in registry order followed by
//! one row per record in primary-key order, every value in canonical text
//! form. A dataset export packs one such file per table into a tar.gz.

use super::archive::ArchiveWriter;
use super::formats::Format;
use super::TableCount;
use crate::db::read_transaction;
use crate::errors::{csv_error, from_rusqlite, io_error, Result};
use crate::repo::RecordStore;
use rusqlite::Connection;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use worldsmith_core::{SchemaRegistry, World};

/// Which tables a dataset export covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportScope {
    /// Tables used by at least one entity type
    #[default]
    Hierarchy,
    /// Every registered table
    AllTables,
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub scope: ExportScope,
    /// Directory for per-table temporaries; the system default when `None`
    pub temp_dir: Option<PathBuf>,
}

/// Write one table as delimited text
///
/// Returns the number of data rows written.
pub fn export_table<W: Write>(
    conn: &Connection,
    schema: &SchemaRegistry,
    table: &str,
    format: &Format,
    sink: W,
) -> Result<usize> {
    let store = RecordStore::new(conn, schema).table(table)?;
    let def = store.def();

    let mut writer = format.writer(sink);
    writer
        .write_record(def.column_names())
        .map_err(|e| csv_error("export_table", e))?;

    let mut rows = 0;
    for record in store.all()?.iter() {
        let record = record?;
        writer
            .write_record(record.render_row(def))
            .map_err(|e| csv_error("export_table", e))?;
        rows += 1;
    }
    writer.flush().map_err(|e| io_error("export_table", e))?;

    tracing::debug!(table, format = format.extension, rows, "table exported");
    Ok(rows)
}

/// Tables covered by a dataset export, in export order
pub fn export_tables(world: &World, scope: ExportScope) -> Vec<String> {
    match scope {
        ExportScope::Hierarchy => world.types().all_tables(),
        ExportScope::AllTables => world.schema().table_names().map(str::to_string).collect(),
    }
}

/// Write every table into a tar.gz archive, one `{table}.{ext}` entry each
///
/// All tables are read inside one read transaction, so the archive reflects
/// the dataset as it was when the export started.
pub fn export_all<W: Write>(
    conn: &Connection,
    world: &World,
    format: &Format,
    options: &ExportOptions,
    sink: W,
) -> Result<Vec<TableCount>> {
    let snapshot = read_transaction(conn)?;
    let mut archive = ArchiveWriter::new(sink);
    let mut counts = Vec::new();

    for table in export_tables(world, options.scope) {
        let mut temp = match &options.temp_dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|e| io_error("export_temp", e))?;

        let rows = {
            let mut out = BufWriter::new(temp.as_file_mut());
            let rows = export_table(&snapshot, world.schema(), &table, format, &mut out)?;
            out.flush().map_err(|e| io_error("export_temp", e))?;
            rows
        };

        let file: &mut File = temp.as_file_mut();
        let size = file
            .seek(SeekFrom::End(0))
            .map_err(|e| io_error("export_temp", e))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| io_error("export_temp", e))?;
        archive.append(Path::new(&format.entry_name(&table)), size, file)?;

        counts.push(TableCount { table, rows });
    }

    archive.finish()?;
    snapshot.commit().map_err(from_rusqlite)?;
    Ok(counts)
}

/// [`export_all`] into a file that appears only once the archive is complete
pub fn export_all_to_file(
    conn: &Connection,
    world: &World,
    format: &Format,
    options: &ExportOptions,
    target: &Path,
) -> Result<Vec<TableCount>> {
    write_atomically(target, |file| export_all(conn, world, format, options, file))
}

/// Build a file next to `target` and rename it into place on success
///
/// On failure the partial file is removed and `target` is left untouched.
pub(crate) fn write_atomically<T, F>(target: &Path, build: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<T>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| io_error("create_archive_temp", e))?;

    let result = {
        let mut out = BufWriter::new(temp.as_file_mut());
        let result = build(&mut out)?;
        out.flush().map_err(|e| io_error("write_archive_temp", e))?;
        result
    };

    temp.persist(target)
        .map_err(|e| io_error("rename_archive_temp", e.error))?;
    Ok(result)
}
