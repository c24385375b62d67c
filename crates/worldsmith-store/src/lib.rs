//! Worldsmith Store - SQLite persistence and bulk transfer
//!
//! Provides:
//! - Connection management and transaction helpers
//! - Migrations for system tables, and world tables built from the schema registry
//! - Record Store: per-table CRUD by primary key, business key or filter
//! - The object-index counter used for synthesized keys
//! - Bulk Codec: delimited-text export/import and tar.gz archives

pub mod bulk;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use repo::{Filter, Predicate, PreparedWrite, RecordStore, TableStore};
