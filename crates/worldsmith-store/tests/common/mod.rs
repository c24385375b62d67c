use rusqlite::Connection;
use std::path::Path;
use worldsmith_core::World;
use worldsmith_store::{db, migrations};

/// The shipped world definition
#[allow(dead_code)]
pub fn default_world() -> World {
    let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../worlds/default.yaml"));
    worldsmith_core::load_world_file(path).unwrap()
}

/// Create an in-memory database with all world tables
#[allow(dead_code)]
pub fn setup_test_db(world: &World) -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    migrations::prepare_database(&mut conn, world.schema()).unwrap();
    conn
}

/// Build submitted field values from pairs
#[allow(dead_code)]
pub fn values(pairs: &[(&str, &str)]) -> worldsmith_core::FieldValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
