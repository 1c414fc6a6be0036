use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use wikisql_to_sqlite::{
    agent::{normalize_sql, schema_text, SqlGenerator},
    cli::{Cli, Commands},
    config,
    dataset::{parse_split_args, Split, WikiSqlDataset},
    schema::{load_schema, schema_from_example},
    writer::{convert_examples, SqliteWriter, TestDbManager},
};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let data_root = config::resolve_data_root(cli.data_root);

    match cli.command {
        Commands::Download {
            splits,
            force,
            continue_on_error,
        } => cmd_download(&data_root, &splits, force, continue_on_error)?,

        Commands::Info => cmd_info(&data_root)?,

        Commands::Sample {
            split,
            index,
            limit,
            convert,
        } => cmd_sample(&data_root, split, index, limit, convert)?,

        Commands::Convert {
            split,
            limit,
            db_path,
        } => cmd_convert(&data_root, split, limit, db_path)?,

        Commands::TestDb {
            name,
            split,
            limit,
            clear,
        } => cmd_test_db(&data_root, &name, split, limit, clear)?,

        Commands::Query { sql, db_path } => cmd_query(&sql, &db_path)?,

        Commands::Generate {
            question,
            db_path,
            split,
            index,
        } => cmd_generate(&data_root, &question, db_path, split, index)?,

        Commands::Evaluate { split, limit } => cmd_evaluate(&data_root, split, limit)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn samples_db_path(data_root: &Path) -> PathBuf {
    data_root.join("wikisql_samples.sqlite")
}

fn cmd_download(
    data_root: &Path,
    splits: &[String],
    force: bool,
    continue_on_error: bool,
) -> Result<()> {
    let splits = parse_split_args(splits)?;
    let dataset = WikiSqlDataset::new(data_root)?;

    let mut failed = 0;
    for &split in &splits {
        match dataset.download(split, force) {
            Ok(path) => println!("{}: {:?}", split, path),
            Err(err) if continue_on_error => {
                eprintln!("{}: {}", split, err);
                failed += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if failed > 0 {
        bail!("{} of {} splits failed to download", failed, splits.len());
    }
    Ok(())
}

fn cmd_info(data_root: &Path) -> Result<()> {
    let dataset = WikiSqlDataset::new(data_root)?;
    let manager = TestDbManager::new(data_root)?;

    println!("Data directory:   {:?}", dataset.data_dir());
    println!("Samples database: {:?}", samples_db_path(data_root));
    println!("Test databases:   {:?}", manager.db_dir());
    println!();

    for status in dataset.splits_info() {
        if status.cached {
            let examples = status
                .examples
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".into());
            let size = status
                .file_size
                .map(format_size)
                .unwrap_or_else(|| "?".into());
            println!(
                "  {:<6} cached   {:>7} examples  {:>9}",
                status.split, examples, size
            );
        } else {
            println!("  {:<6} missing", status.split);
        }
    }

    Ok(())
}

fn cmd_sample(
    data_root: &Path,
    split: Split,
    index: usize,
    limit: usize,
    convert: bool,
) -> Result<()> {
    let mut dataset = WikiSqlDataset::new(data_root)?;
    let examples = dataset.example_window(split, index, limit)?;

    let mut writer = if convert {
        Some(SqliteWriter::new(&samples_db_path(data_root))?)
    } else {
        None
    };

    for (i, example) in examples.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("[{} #{}] {}", split, index + i, example.question);
        println!("  columns: {}", example.table.header.join(", "));
        println!("  types:   {}", example.table.types.join(", "));
        for row in example.table.rows.iter().take(3) {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            println!("  row:     {}", cells.join(" | "));
        }
        if example.table.rows.len() > 3 {
            println!("  ... {} more rows", example.table.rows.len() - 3);
        }
        if let Some(sql) = &example.sql.human_readable {
            println!("  sql:     {}", sql);
        }

        if let Some(writer) = writer.as_mut() {
            let result = writer.convert_example(example)?;
            println!("  table:   {}", result.table_name);
            println!("{}", indent(&result.create_sql, "  "));
            if let Some(target) = &result.target_sql {
                println!("  target:  {}", target);
            }
        }
    }

    Ok(())
}

fn cmd_convert(
    data_root: &Path,
    split: Split,
    limit: usize,
    db_path: Option<PathBuf>,
) -> Result<()> {
    let mut dataset = WikiSqlDataset::new(data_root)?;
    let examples = dataset.load_split(split, Some(limit))?;
    if examples.is_empty() {
        bail!("split '{}' has no examples to convert", split);
    }

    let db_path = db_path.unwrap_or_else(|| samples_db_path(data_root));
    let results = convert_examples(&db_path, &examples)?;

    println!("\nCreated {:?} ({} tables)", db_path, results.len());
    let writer = SqliteWriter::new(&db_path)?;
    for name in writer.table_names()? {
        println!("  {}", name);
    }

    Ok(())
}

fn cmd_test_db(data_root: &Path, name: &str, split: Split, limit: usize, clear: bool) -> Result<()> {
    let manager = TestDbManager::new(data_root)?;

    if clear {
        let removed = manager.clear()?;
        println!("Removed {} test database(s)", removed);
        return Ok(());
    }

    let mut dataset = WikiSqlDataset::new(data_root)?;
    let examples = dataset.load_split(split, Some(limit))?;
    if examples.is_empty() {
        bail!("split '{}' has no examples to convert", split);
    }

    let (db_path, results) = manager.create_test_db(name, &examples)?;
    println!("Created {:?} ({} tables)", db_path, results.len());

    let writer = SqliteWriter::new(&db_path)?;
    for result in &results {
        let count_sql = format!("SELECT COUNT(*) FROM \"{}\"", result.table_name);
        let (_, rows) = writer.execute_query(&count_sql)?;
        let count = match rows.first().and_then(|row| row.first()) {
            Some(rusqlite::types::Value::Integer(n)) => *n,
            _ => 0,
        };
        println!("  {:<20} {:>5} rows", result.table_name, count);
    }

    Ok(())
}

fn cmd_query(sql: &str, db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        bail!("database not found: {:?}", db_path);
    }

    let writer = SqliteWriter::new(db_path)?;
    let (columns, rows) = writer.execute_query(sql)?;

    println!("{}", columns.join(" | "));
    for row in rows.iter().take(20) {
        let cells: Vec<String> = row.iter().map(sqlite_value_text).collect();
        println!("{}", cells.join(" | "));
    }
    if rows.len() > 20 {
        println!("... {} more rows", rows.len() - 20);
    }
    println!("\n{} row(s)", rows.len());

    Ok(())
}

fn cmd_generate(
    data_root: &Path,
    question: &str,
    db_path: Option<PathBuf>,
    split: Split,
    index: usize,
) -> Result<()> {
    // Fail before any schema or dataset work when the credential is missing.
    let generator = SqlGenerator::new()?;

    let schema = match db_path {
        Some(path) => {
            if !path.exists() {
                bail!("database not found: {:?}", path);
            }
            load_schema(&path)?
        }
        None => {
            let mut dataset = WikiSqlDataset::new(data_root)?;
            let example = dataset.get_example(split, index)?;
            schema_from_example(&example)?
        }
    };

    let schema_str = schema_text(&schema);
    let sql = generator.generate(question, &schema_str)?;

    println!("Schema:\n{}\n", schema_str);
    println!("SQL: {}", sql);

    Ok(())
}

fn cmd_evaluate(data_root: &Path, split: Split, limit: usize) -> Result<()> {
    let generator = SqlGenerator::new()?;
    let mut dataset = WikiSqlDataset::new(data_root)?;
    let examples = dataset.load_split(split, Some(limit))?;

    let mut scored = 0usize;
    let mut correct = 0usize;
    let mut failed = 0usize;

    for (i, example) in examples.iter().enumerate() {
        let Some(expected) = example.sql.human_readable.as_deref() else {
            continue;
        };

        let schema = schema_from_example(example)?;
        match generator.generate(&example.question, &schema_text(&schema)) {
            Ok(sql) => {
                scored += 1;
                if normalize_sql(&sql) == normalize_sql(expected) {
                    correct += 1;
                    println!("[{:>3}] ok   {}", i, example.question);
                } else {
                    println!("[{:>3}] miss {}", i, example.question);
                    println!("      expected: {}", expected);
                    println!("      got:      {}", sql);
                }
            }
            Err(err) => {
                failed += 1;
                println!("[{:>3}] fail {}: {}", i, example.question, err);
            }
        }
    }

    if scored == 0 {
        bail!("no examples in split '{}' could be scored", split);
    }

    let accuracy = 100.0 * correct as f64 / scored as f64;
    println!(
        "\n{} scored, {} correct, {} generation failures",
        scored, correct, failed
    );
    println!("Exact-match accuracy: {:.2}%", accuracy);

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} B", bytes)
    }
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn sqlite_value_text(value: &rusqlite::types::Value) -> String {
    use rusqlite::types::Value;

    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}
