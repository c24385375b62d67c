use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;
use worldsmith_core::World;
use worldsmith_engine::commands::GroupValues;
use worldsmith_store::{db, migrations};

/// The shipped world definition
#[allow(dead_code)]
pub fn default_world() -> World {
    let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../worlds/default.yaml"));
    worldsmith_core::load_world_file(path).unwrap()
}

/// In-memory database with every world table
#[allow(dead_code)]
pub fn setup_test_db(world: &World) -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    migrations::prepare_database(&mut conn, world.schema()).unwrap();
    conn
}

/// File-backed database, for tests that open several connections
#[allow(dead_code)]
pub fn setup_file_db(world: &World) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("world.db");
    let mut conn = db::open(&path).unwrap();
    migrations::prepare_database(&mut conn, world.schema()).unwrap();
    (temp_dir, path)
}

#[allow(dead_code)]
pub fn values(pairs: &[(&str, &str)]) -> worldsmith_core::FieldValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[allow(dead_code)]
pub fn group(table: &str, pairs: &[(&str, &str)]) -> GroupValues {
    GroupValues::new(table, values(pairs))
}

/// Rendered value of `field` on the record with business key `key`
#[allow(dead_code)]
pub fn field_of(conn: &Connection, world: &World, table: &str, key: &str, field: &str) -> String {
    let store = worldsmith_store::RecordStore::new(conn, world.schema());
    let record = store.table(table).unwrap().get_by_business_key(key).unwrap();
    record.get(field).map(|v| v.render()).unwrap_or_default()
}

#[allow(dead_code)]
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}
