use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use wikisql_to_sqlite::schema::load_schema;

#[derive(Parser, Debug)]
#[command(name = "schema2json")]
#[command(version, about = "Extract a SQLite database schema as JSON")]
struct Args {
    /// Database to inspect
    db_path: PathBuf,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !args.db_path.exists() {
        bail!("database not found: {:?}", args.db_path);
    }

    let schema = load_schema(&args.db_path)?;

    match args.output {
        Some(path) => {
            schema.save(&path, args.pretty)?;
            eprintln!("schema written to {:?}", path);
        }
        None => {
            let json = if args.pretty {
                schema.to_json_pretty()?
            } else {
                schema.to_json()?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
