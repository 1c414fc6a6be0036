use rusqlite::Connection;
use std::path::Path;

use crate::error::Result;
use crate::schema::types::{ColumnSchema, ForeignKeyEdge, SchemaDocument, TableSchema};

/// Reflect the schema of a live SQLite database into a
/// `SchemaDocument`. Only what the catalog reports is used; internal
/// `sqlite_*` tables are skipped.
pub fn load_schema(db_path: &Path) -> Result<SchemaDocument> {
    let conn = Connection::open(db_path)?;
    load_schema_from_connection(&conn)
}

pub fn load_schema_from_connection(conn: &Connection) -> Result<SchemaDocument> {
    let mut tables = Vec::new();
    for name in table_names(conn)? {
        let columns = table_columns(conn, &name)?;
        let foreign_keys = table_foreign_keys(conn, &name)?;
        tables.push(TableSchema {
            name,
            columns,
            foreign_keys,
        });
    }
    Ok(SchemaDocument { tables })
}

fn table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnSchema>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map([table], |row| {
            Ok(ColumnSchema {
                name: row.get(0)?,
                col_type: row.get(1)?,
                not_null: row.get::<_, i64>(2)? != 0,
                is_primary_key: row.get::<_, i64>(3)? != 0,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn table_foreign_keys(conn: &Connection, table: &str) -> Result<Vec<ForeignKeyEdge>> {
    let mut stmt = conn.prepare(
        "SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
    )?;
    let foreign_keys = stmt
        .query_map([table], |row| {
            Ok(ForeignKeyEdge {
                column: row.get(0)?,
                referenced_table: row.get(1)?,
                referenced_column: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(foreign_keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT
            );
            CREATE TABLE orders (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                amount REAL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_reflects_tables_and_columns() {
        let conn = fixture_db();
        let schema = load_schema_from_connection(&conn).unwrap();

        assert_eq!(schema.tables.len(), 2);
        let users = schema.tables.iter().find(|t| t.name == "users").unwrap();
        assert_eq!(users.columns.len(), 3);
        assert_eq!(users.columns[0].name, "id");
        assert!(users.columns[0].is_primary_key);
        assert!(users.columns[1].not_null);
        assert!(!users.columns[2].not_null);
        assert!(users.foreign_keys.is_empty());
    }

    #[test]
    fn test_reflects_foreign_keys() {
        let conn = fixture_db();
        let schema = load_schema_from_connection(&conn).unwrap();

        let orders = schema.tables.iter().find(|t| t.name == "orders").unwrap();
        assert_eq!(orders.foreign_keys.len(), 1);
        let fk = &orders.foreign_keys[0];
        assert_eq!(fk.column, "user_id");
        assert_eq!(fk.referenced_table, "users");
        assert_eq!(fk.referenced_column, "id");
    }

    #[test]
    fn test_skips_internal_tables() {
        let conn = fixture_db();
        // Forces sqlite_sequence into existence.
        conn.execute_batch("CREATE TABLE counters (id INTEGER PRIMARY KEY AUTOINCREMENT, n INTEGER);")
            .unwrap();
        let schema = load_schema_from_connection(&conn).unwrap();
        assert!(schema.tables.iter().all(|t| !t.name.starts_with("sqlite_")));
    }
}
