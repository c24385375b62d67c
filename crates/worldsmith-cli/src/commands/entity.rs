//! Entity maintenance commands

use super::{CliResult, Context};
use clap::{Args, Subcommand};
use worldsmith_engine::commands::object_editor;

#[derive(Debug, Args)]
pub struct EntityArgs {
    #[command(subcommand)]
    pub command: EntityCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntityCommand {
    /// Delete an entity from every table of its type family
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Business key of the entity
    pub key: String,

    /// Base type whose subtypes' tables are cleared; the stored type when omitted
    #[arg(long)]
    pub base: Option<String>,
}

pub fn execute(context: &Context, args: EntityArgs) -> CliResult {
    match args.command {
        EntityCommand::Delete(delete_args) => execute_delete(context, delete_args),
    }
}

fn execute_delete(context: &Context, args: DeleteArgs) -> CliResult {
    let (world, mut conn) = context.open()?;

    let removed = object_editor::delete_entity(&mut conn, &world, &args.key, args.base.as_deref())?;

    println!("Deleted {} records of {}", removed, args.key);
    Ok(())
}
