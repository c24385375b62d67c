//! Import command

use super::{CliResult, Context};
use clap::Args;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use worldsmith_engine::commands::transfer;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Dataset archive (.tar.gz), or a delimited-text file with --table
    pub file: PathBuf,

    /// Import the file into this table; the format comes from its extension
    #[arg(long)]
    pub table: Option<String>,
}

pub fn execute(context: &Context, args: ImportArgs) -> CliResult {
    let (world, mut conn) = context.open()?;
    let source = BufReader::new(File::open(&args.file)?);

    let summary = match &args.table {
        Some(table) => {
            let extension = args
                .file
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default();
            transfer::import_table(&mut conn, &world, table, extension, source)?
        }
        None => transfer::import_archive(&mut conn, &world, source)?,
    };

    for count in &summary.tables {
        println!("{}\t{}", count.table, count.rows);
    }
    println!(
        "Imported {} rows ({} inserted, {} updated)",
        summary.rows(),
        summary.inserted,
        summary.updated
    );
    Ok(())
}
