//! Bulk transfer commands with boundary logging.
//!
//! Thin wrappers over `worldsmith_store::bulk` that resolve the format from
//! a file extension first, so an unsupported format fails before any output
//! is produced.

use rusqlite::Connection;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;
use worldsmith_core::{log_op_end, log_op_error, log_op_start, World};
use worldsmith_store::bulk::{self, format_for, ExportOptions, ImportSummary, TableCount};
use worldsmith_store::errors::Result;

/// Export one table as delimited text
///
/// ## Returns
///
/// Number of data rows written
///
/// ## Errors
///
/// - `UnsupportedFormat`: unknown extension (nothing written)
/// - `UnknownTable`: table not registered
/// - `Io` / `Persistence`: sink or database failure
pub fn export_table<W: Write>(
    conn: &Connection,
    world: &World,
    table: &str,
    extension: &str,
    sink: W,
) -> Result<usize> {
    log_op_start!("export_table", table = table, format = extension);
    let start = Instant::now();

    let rows = format_for(extension)
        .and_then(|format| bulk::export_table(conn, world.schema(), table, format, sink))
        .map_err(|e| {
            log_op_error!(
                "export_table",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "export_table",
        duration_ms = start.elapsed().as_millis() as u64,
        rows = rows
    );

    Ok(rows)
}

/// Export the dataset as a tar.gz archive written to `sink`
///
/// ## Errors
///
/// - `UnsupportedFormat`: unknown extension (nothing written)
/// - `Io` / `Persistence`: sink, temporary file or database failure
pub fn export_all<W: Write>(
    conn: &Connection,
    world: &World,
    extension: &str,
    options: &ExportOptions,
    sink: W,
) -> Result<Vec<TableCount>> {
    log_op_start!("export_all", format = extension, scope = ?options.scope);
    let start = Instant::now();

    let counts = format_for(extension)
        .and_then(|format| bulk::export_all(conn, world, format, options, sink))
        .map_err(|e| {
            log_op_error!(
                "export_all",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "export_all",
        duration_ms = start.elapsed().as_millis() as u64,
        tables = counts.len()
    );

    Ok(counts)
}

/// Export the dataset as a tar.gz archive at `target`
///
/// The file appears only once the archive is complete.
///
/// ## Errors
///
/// - `UnsupportedFormat`: unknown extension (no file created)
/// - `Io` / `Persistence`: filesystem or database failure (no file left)
pub fn export_all_to_file(
    conn: &Connection,
    world: &World,
    extension: &str,
    options: &ExportOptions,
    target: &Path,
) -> Result<Vec<TableCount>> {
    log_op_start!(
        "export_all_to_file",
        format = extension,
        target = %target.display()
    );
    let start = Instant::now();

    let counts = format_for(extension)
        .and_then(|format| bulk::export_all_to_file(conn, world, format, options, target))
        .map_err(|e| {
            log_op_error!(
                "export_all_to_file",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "export_all_to_file",
        duration_ms = start.elapsed().as_millis() as u64,
        tables = counts.len()
    );

    Ok(counts)
}

/// Pack the non-hidden files under `root` into a tar.gz written to `sink`
///
/// ## Returns
///
/// Number of files archived
///
/// ## Errors
///
/// - `Io`: a file or directory could not be read
pub fn export_resources<W: Write>(root: &Path, sink: W) -> Result<usize> {
    log_op_start!("export_resources", root = %root.display());
    let start = Instant::now();

    let files = bulk::export_resources(root, sink).map_err(|e| {
        log_op_error!(
            "export_resources",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "export_resources",
        duration_ms = start.elapsed().as_millis() as u64,
        files = files
    );

    Ok(files)
}

/// Pack the non-hidden files under `root` into a tar.gz at `target`
///
/// ## Errors
///
/// - `Io`: a file could not be read or written (no archive left behind)
pub fn export_resources_to_file(root: &Path, target: &Path) -> Result<usize> {
    log_op_start!(
        "export_resources_to_file",
        root = %root.display(),
        target = %target.display()
    );
    let start = Instant::now();

    let files = bulk::export_resources_to_file(root, target).map_err(|e| {
        log_op_error!(
            "export_resources_to_file",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "export_resources_to_file",
        duration_ms = start.elapsed().as_millis() as u64,
        files = files
    );

    Ok(files)
}

/// Import one table from a delimited-text stream in one transaction
///
/// ## Errors
///
/// - `UnsupportedFormat`: unknown extension (nothing read)
/// - `UnknownTable`: table not registered
/// - `Validation`: a row failed validation; names the data row (nothing
///   is written)
pub fn import_table<R: Read>(
    conn: &mut Connection,
    world: &World,
    table: &str,
    extension: &str,
    source: R,
) -> Result<ImportSummary> {
    log_op_start!("import_table", table = table, format = extension);
    let start = Instant::now();

    let summary = format_for(extension)
        .and_then(|format| bulk::import_table(conn, world.schema(), table, format, source))
        .map_err(|e| {
            log_op_error!(
                "import_table",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "import_table",
        duration_ms = start.elapsed().as_millis() as u64,
        inserted = summary.inserted,
        updated = summary.updated
    );

    Ok(summary)
}

/// Import every `{table}.{ext}` entry of a tar.gz archive in one transaction
///
/// ## Errors
///
/// - `UnsupportedFormat`: an entry has an unknown extension
/// - `UnknownTable`: an entry names an unregistered table
/// - `Validation`: a row failed validation (nothing is written)
pub fn import_archive<R: Read>(
    conn: &mut Connection,
    world: &World,
    source: R,
) -> Result<ImportSummary> {
    log_op_start!("import_archive");
    let start = Instant::now();

    let summary = bulk::import_archive(conn, world.schema(), source).map_err(|e| {
        log_op_error!(
            "import_archive",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "import_archive",
        duration_ms = start.elapsed().as_millis() as u64,
        tables = summary.tables.len(),
        inserted = summary.inserted,
        updated = summary.updated
    );

    Ok(summary)
}
