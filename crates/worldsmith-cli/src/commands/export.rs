//! Export commands

use super::{CliResult, Context};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use worldsmith_engine::commands::transfer;
use worldsmith_store::bulk::{ExportOptions, ExportScope};

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub command: ExportCommand,
}

#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    /// Export one table as delimited text
    Table(TableArgs),
    /// Export every table into a tar.gz archive
    All(AllArgs),
    /// Pack a resource directory into a tar.gz archive
    Resources(ResourcesArgs),
}

#[derive(Debug, Args)]
pub struct TableArgs {
    pub table: String,

    /// File extension of the format (csv, tsv)
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Output file; stdout when omitted
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AllArgs {
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Archive to create
    #[arg(long)]
    pub out: PathBuf,

    /// Include tables no entity type uses
    #[arg(long)]
    pub all_tables: bool,
}

#[derive(Debug, Args)]
pub struct ResourcesArgs {
    /// Directory to pack
    pub root: PathBuf,

    /// Archive to create
    #[arg(long)]
    pub out: PathBuf,
}

pub fn execute(context: &Context, args: ExportArgs) -> CliResult {
    match args.command {
        ExportCommand::Table(table_args) => execute_table(context, table_args),
        ExportCommand::All(all_args) => execute_all(context, all_args),
        ExportCommand::Resources(resources_args) => execute_resources(resources_args),
    }
}

fn execute_table(context: &Context, args: TableArgs) -> CliResult {
    let (world, conn) = context.open()?;

    let rows = match &args.out {
        Some(path) => {
            let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
            let rows = transfer::export_table(&conn, &world, &args.table, &args.format, &mut file)?;
            file.flush()?;
            rows
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let rows = transfer::export_table(&conn, &world, &args.table, &args.format, &mut out)?;
            out.flush()?;
            rows
        }
    };

    eprintln!("Exported {} rows from {}", rows, args.table);
    Ok(())
}

fn execute_all(context: &Context, args: AllArgs) -> CliResult {
    let (world, conn) = context.open()?;
    let options = ExportOptions {
        scope: if args.all_tables {
            ExportScope::AllTables
        } else {
            ExportScope::Hierarchy
        },
        temp_dir: None,
    };

    let counts = transfer::export_all_to_file(&conn, &world, &args.format, &options, &args.out)?;

    for count in &counts {
        println!("{}\t{}", count.table, count.rows);
    }
    println!("Exported {} tables to {}", counts.len(), args.out.display());
    Ok(())
}

fn execute_resources(args: ResourcesArgs) -> CliResult {
    let files = transfer::export_resources_to_file(&args.root, &args.out)?;

    println!("Packed {} files into {}", files, args.out.display());
    Ok(())
}
