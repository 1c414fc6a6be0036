use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::sql_gen::{
    derive_table_name, generate_create_table_sql, generate_insert_sql, rewrite_table_token,
    sample_query,
};
use crate::dataset::example::Example;
use crate::error::Result;

/// What one example became in the database.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub table_name: String,
    pub db_path: PathBuf,
    pub create_sql: String,
    pub sample_query: String,
    /// Annotated SQL with the placeholder table word rewritten to the
    /// materialized name, when the example carries annotated SQL.
    pub target_sql: Option<String>,
}

/// Writes WikiSQL examples into a SQLite database, one table per
/// example. The connection lives as long as the writer and is released
/// on drop.
pub struct SqliteWriter {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteWriter {
    /// Open (or create) the database. Existing tables are left alone;
    /// individual conversions drop and recreate only their own table.
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;

        Ok(Self {
            conn,
            db_path: db_path.to_path_buf(),
        })
    }

    /// Materialize one example: drop any previous table of the same
    /// name, recreate it, and insert every row in order, all in one
    /// transaction.
    pub fn convert_example(&mut self, example: &Example) -> Result<ConversionResult> {
        example.validate()?;

        let table_name = derive_table_name(example);
        let create_sql = generate_create_table_sql(example, &table_name);
        let insert_sqls = generate_insert_sql(example, &table_name);

        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("DROP TABLE IF EXISTS \"{}\";", table_name),
            [],
        )?;
        tx.execute(&create_sql, [])?;
        for insert_sql in &insert_sqls {
            tx.execute(insert_sql, [])?;
        }
        tx.commit()?;

        debug!(
            "materialized table '{}' with {} rows",
            table_name,
            insert_sqls.len()
        );

        let target_sql = example
            .sql
            .human_readable
            .as_deref()
            .map(|sql| rewrite_table_token(sql, &table_name));

        Ok(ConversionResult {
            sample_query: sample_query(&table_name),
            table_name,
            db_path: self.db_path.clone(),
            create_sql,
            target_sql,
        })
    }

    /// Run a query and return column names plus all rows. Values come
    /// back as raw SQLite values so callers decide how to render them.
    pub fn execute_query(
        &self,
        query: &str,
    ) -> Result<(Vec<String>, Vec<Vec<rusqlite::types::Value>>)> {
        let mut stmt = self.conn.prepare(query)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut rows = Vec::new();
        let mut raw = stmt.query([])?;
        while let Some(row) = raw.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(row.get::<_, rusqlite::types::Value>(i)?);
            }
            rows.push(values);
        }

        Ok((columns, rows))
    }

    /// Names of user tables currently in the database.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

/// Convert a batch of examples into the database at `db_path`,
/// stopping at the first failure.
pub fn convert_examples(db_path: &Path, examples: &[Example]) -> Result<Vec<ConversionResult>> {
    let mut writer = SqliteWriter::new(db_path)?;

    let pb = ProgressBar::new(examples.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:12} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb.set_message("converting");

    let mut results = Vec::with_capacity(examples.len());
    for example in examples {
        results.push(writer.convert_example(example)?);
        pb.inc(1);
    }

    pb.finish_with_message(format!("{} examples", results.len()));
    Ok(results)
}
