//! Worldsmith CLI
//!
//! Command-line interface for bulk transfer and entity maintenance

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use worldsmith_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "worldsmith")]
#[command(about = "Worldsmith - World data export, import and maintenance", long_about = None)]
struct Cli {
    /// SQLite database holding the world data
    #[arg(long, global = true, env = "WORLDSMITH_DB", default_value = "world.db")]
    db: PathBuf,

    /// World definition (YAML)
    #[arg(long, global = true, env = "WORLDSMITH_WORLD", default_value = "worlds/default.yaml")]
    world: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Export tables, the whole dataset, or resource files
    Export(commands::export::ExportArgs),
    /// Import a delimited-text file or a dataset archive
    Import(commands::import::ImportArgs),
    /// Entity maintenance
    Entity(commands::entity::EntityArgs),
}

fn main() {
    init(Profile::Development);
    let cli = Cli::parse();
    let context = commands::Context {
        db: cli.db,
        world: cli.world,
    };

    let result = match cli.command {
        Commands::Export(args) => commands::export::execute(&context, args),
        Commands::Import(args) => commands::import::execute(&context, args),
        Commands::Entity(args) => commands::entity::execute(&context, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
