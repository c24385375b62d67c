//! Migration runner
//!
//! Each embedded migration runs at most once. Its SHA-256 is recorded in
//! `schema_version`; a recorded checksum that no longer matches the embedded
//! SQL means the migration was edited after release and is an error.

use crate::db::write_transaction;
use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, Migration};
use rusqlite::{Connection, OptionalExtension};

const SCHEMA_VERSION_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    migration_id TEXT NOT NULL UNIQUE,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL
)";

/// Apply every pending migration, in order
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute(SCHEMA_VERSION_DDL, []).map_err(from_rusqlite)?;

    let mut applied = 0;
    for migration in get_migrations() {
        if apply_migration(conn, &migration)? {
            applied += 1;
        }
    }
    if applied > 0 {
        tracing::debug!(applied, "migrations applied");
    }
    Ok(())
}

/// Returns whether the migration was run now
fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<bool> {
    let checksum = compute_checksum(migration.sql);

    let recorded: Option<String> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?1",
            [migration.id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    match recorded {
        Some(recorded) if recorded == checksum => return Ok(false),
        Some(recorded) => return Err(checksum_mismatch(migration.id, &recorded, &checksum)),
        None => {}
    }

    let tx = write_transaction(conn)?;
    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![migration.id, chrono::Utc::now().timestamp(), checksum],
    )
    .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id = migration.id, "migration applied");
    Ok(true)
}
