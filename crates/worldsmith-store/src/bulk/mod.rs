//! Bulk Codec
//!
//! Tables to delimited text and back, whole-dataset archives, and archives
//! of resource directories.

pub mod archive;
pub mod export;
pub mod formats;
pub mod import;
pub mod resources;

pub use export::{export_all, export_all_to_file, export_table, ExportOptions, ExportScope};
pub use formats::{format_for, Format};
pub use import::{import_archive, import_table, ImportSummary};
pub use resources::{export_resources, export_resources_to_file};

/// Rows written or read for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub table: String,
    pub rows: usize,
}
