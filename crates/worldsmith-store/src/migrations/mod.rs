//! Migration framework
//!
//! Provides:
//! - Migration runner with checksums and idempotent application
//! - Embedded SQL migrations for the store's own tables
//! - World table creation from the schema registry

mod checksums;
mod embedded;
mod runner;
mod world_tables;

pub use runner::apply_migrations;
pub use world_tables::{create_table_sql, ensure_world_tables, quote_ident};

use crate::errors::Result;
use rusqlite::Connection;
use worldsmith_core::SchemaRegistry;

/// Bring a database up to date for the given schema
pub fn prepare_database(conn: &mut Connection, schema: &SchemaRegistry) -> Result<()> {
    apply_migrations(conn)?;
    ensure_world_tables(conn, schema)
}
