use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::dataset::Split;

#[derive(Parser, Debug)]
#[command(name = "wikisql-to-sqlite")]
#[command(version, about = "Convert WikiSQL examples to SQLite databases for text-to-SQL experiments")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for cached splits and test databases
    #[arg(long, global = true)]
    pub data_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download one or more splits into the local cache
    Download {
        /// Splits to download (train, dev, test, or all)
        #[arg(required = true)]
        splits: Vec<String>,

        /// Force re-download even if cached
        #[arg(short, long)]
        force: bool,

        /// Keep going if one split fails
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Show cache status for every split
    Info,

    /// Print one or more examples from a split
    Sample {
        /// Split to read from
        #[arg(short, long, default_value = "train")]
        split: Split,

        /// Index of the first example
        #[arg(short, long, default_value_t = 0)]
        index: usize,

        /// Number of examples to print
        #[arg(short, long, default_value_t = 1)]
        limit: usize,

        /// Also materialize each example and print its DDL
        #[arg(short, long)]
        convert: bool,
    },

    /// Materialize a slice of a split into one SQLite database
    Convert {
        /// Split to convert
        #[arg(short, long, default_value = "dev")]
        split: Split,

        /// Number of examples to convert
        #[arg(short, long, default_value_t = 50)]
        limit: usize,

        /// Output database path
        #[arg(long)]
        db_path: Option<PathBuf>,
    },

    /// Create or clear named test databases
    TestDb {
        /// Name of the test database
        #[arg(short, long, default_value = "test")]
        name: String,

        /// Split to draw examples from
        #[arg(short, long, default_value = "dev")]
        split: Split,

        /// Number of examples to include
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Remove all test databases instead of creating one
        #[arg(long)]
        clear: bool,
    },

    /// Run a SQL query against a converted database
    Query {
        /// SQL to execute
        sql: String,

        /// Database to query
        #[arg(long)]
        db_path: PathBuf,
    },

    /// Generate SQL for a question with the completion service
    Generate {
        /// Natural-language question
        #[arg(short, long)]
        question: String,

        /// Take the schema from this database instead of an example
        #[arg(long, conflicts_with_all = ["split", "index"])]
        db_path: Option<PathBuf>,

        /// Split holding the schema example
        #[arg(short, long, default_value = "dev")]
        split: Split,

        /// Index of the schema example
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },

    /// Score generated SQL against the annotated queries of a split
    Evaluate {
        /// Split to evaluate on
        #[arg(short, long, default_value = "dev")]
        split: Split,

        /// Number of examples to score
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
