pub mod entity;
pub mod export;
pub mod import;

use rusqlite::Connection;
use std::path::PathBuf;
use worldsmith_core::World;
use worldsmith_store::{db, migrations};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Global options shared by every subcommand
#[derive(Debug, Clone)]
pub struct Context {
    pub db: PathBuf,
    pub world: PathBuf,
}

impl Context {
    /// Load the world and open its database, creating missing tables
    pub fn open(&self) -> Result<(World, Connection), Box<dyn std::error::Error>> {
        let world = worldsmith_core::load_world_file(&self.world)?;
        let mut conn = db::open(&self.db)?;
        migrations::prepare_database(&mut conn, world.schema())?;
        tracing::debug!(db = %self.db.display(), world = %self.world.display(), "world opened");
        Ok((world, conn))
    }
}
