use serde_json::Value;

use crate::dataset::example::Example;
use crate::schema::types::sqlite_type_for;

/// Derive the table name for an example from its header and the first
/// three question tokens. FNV-1a keeps the name stable across runs, so
/// re-converting the same example always lands on the same table.
pub fn derive_table_name(example: &Example) -> String {
    let mut key = String::new();
    for header in &example.table.header {
        key.push_str(header);
        key.push('\x1f');
    }
    for token in example.question.split_whitespace().take(3) {
        key.push_str(token);
        key.push('\x1f');
    }
    format!("ex_{:016x}", fnv1a64(key.as_bytes()))
}

/// FNV-1a. Stable across runs and platforms, unlike the default
/// hasher.
fn fnv1a64(data: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325; // FNV offset basis
    for &b in data {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3); // FNV prime
    }
    h
}

/// CREATE TABLE statement for an example's table. Columns are
/// double-quoted; the first column becomes the primary key when its
/// type tag is `number`.
pub fn generate_create_table_sql(example: &Example, table_name: &str) -> String {
    let columns: Vec<String> = example
        .table
        .header
        .iter()
        .zip(example.table.types.iter())
        .enumerate()
        .map(|(i, (header, tag))| {
            let sql_type = sqlite_type_for(tag);
            if i == 0 && tag.eq_ignore_ascii_case("number") {
                format!("{} {} PRIMARY KEY", quote_ident(header), sql_type)
            } else {
                format!("{} {}", quote_ident(header), sql_type)
            }
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n);",
        quote_ident(table_name),
        columns.join(",\n  ")
    )
}

/// One INSERT statement per row, in row order.
pub fn generate_insert_sql(example: &Example, table_name: &str) -> Vec<String> {
    let headers: Vec<String> = example.table.header.iter().map(|h| quote_ident(h)).collect();
    let headers = headers.join(", ");

    example
        .table
        .rows
        .iter()
        .map(|row| {
            let values: Vec<String> = row.iter().map(sql_literal).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({});",
                quote_ident(table_name),
                headers,
                values.join(", ")
            )
        })
        .collect()
}

/// Canned query the CLI offers after a conversion.
pub fn sample_query(table_name: &str) -> String {
    format!("SELECT * FROM {} LIMIT 5;", quote_ident(table_name))
}

/// Replace the standalone word `table` with the materialized table
/// name, leaving single-quoted literals untouched. WikiSQL's annotated
/// SQL refers to every table by that placeholder word.
pub fn rewrite_table_token(sql: &str, table_name: &str) -> String {
    const TOKEN: &str = "table";

    let mut out = String::with_capacity(sql.len() + table_name.len());
    let mut prev: Option<char> = None;
    let mut in_literal = false;
    let mut i = 0;

    while i < sql.len() {
        let rest = &sql[i..];
        let c = rest.chars().next().unwrap();

        if in_literal {
            out.push(c);
            i += c.len_utf8();
            if c == '\'' {
                // '' stays inside the literal
                if sql[i..].starts_with('\'') {
                    out.push('\'');
                    i += 1;
                } else {
                    in_literal = false;
                }
            }
            prev = Some(c);
            continue;
        }

        if c == '\'' {
            in_literal = true;
            out.push(c);
            i += 1;
            prev = Some(c);
            continue;
        }

        if rest.starts_with(TOKEN) {
            let before_ok = !prev.map_or(false, is_word_char);
            let after_ok = !sql[i + TOKEN.len()..].chars().next().map_or(false, is_word_char);
            if before_ok && after_ok {
                out.push_str(table_name);
                i += TOKEN.len();
                prev = TOKEN.chars().last();
                continue;
            }
        }

        out.push(c);
        i += c.len_utf8();
        prev = Some(c);
    }

    out
}

fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render one cell as a SQL literal. Strings are single-quoted with
/// embedded quotes doubled, null becomes NULL, everything else is
/// written verbatim.
fn sql_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::example::{ExampleTable, SqlAnnotation};
    use serde_json::json;

    fn transactions_example() -> Example {
        Example {
            id: Some("1".into()),
            question: "How many transactions did Alice make in April?".into(),
            table: ExampleTable {
                header: vec!["id".into(), "name".into(), "amount".into(), "date".into()],
                types: vec!["number".into(), "text".into(), "real".into(), "text".into()],
                rows: vec![
                    vec![json!("1"), json!("Alice"), json!("120.5"), json!("2025-04-01")],
                    vec![json!("2"), json!("Bob"), json!("99.9"), json!("2025-04-02")],
                ],
            },
            sql: SqlAnnotation {
                human_readable: Some("SELECT COUNT(id) FROM table WHERE name = 'Alice'".into()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_table_name_is_stable() {
        let ex = transactions_example();
        assert_eq!(derive_table_name(&ex), derive_table_name(&ex));
    }

    #[test]
    fn test_table_name_format() {
        let name = derive_table_name(&transactions_example());
        let hex = name.strip_prefix("ex_").expect("ex_ prefix");
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_table_name_depends_on_question_prefix() {
        let ex = transactions_example();
        let mut other = ex.clone();
        other.question = "Completely different question entirely".into();
        assert_ne!(derive_table_name(&ex), derive_table_name(&other));

        // Only the first three tokens matter.
        let mut same_prefix = ex.clone();
        same_prefix.question = "How many transactions happened on Tuesday?".into();
        assert_eq!(derive_table_name(&ex), derive_table_name(&same_prefix));
    }

    #[test]
    fn test_create_table_sql_exact() {
        let ex = transactions_example();
        let name = derive_table_name(&ex);
        let sql = generate_create_table_sql(&ex, &name);
        let expected = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n  \"id\" INTEGER PRIMARY KEY,\n  \"name\" TEXT,\n  \"amount\" REAL,\n  \"date\" TEXT\n);",
            name
        );
        assert_eq!(sql, expected);
    }

    #[test]
    fn test_create_table_one_definition_per_column() {
        let ex = transactions_example();
        let sql = generate_create_table_sql(&ex, "ex_test");
        let definitions = sql.matches("\n  \"").count();
        assert_eq!(definitions, ex.table.header.len());
    }

    #[test]
    fn test_no_primary_key_for_text_first_column() {
        let mut ex = transactions_example();
        ex.table.header = vec!["name".into(), "rank".into()];
        ex.table.types = vec!["text".into(), "number".into()];
        ex.table.rows.clear();
        let sql = generate_create_table_sql(&ex, "ex_test");
        assert!(!sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_insert_sql_exact() {
        let ex = transactions_example();
        let name = derive_table_name(&ex);
        let inserts = generate_insert_sql(&ex, &name);
        assert_eq!(inserts.len(), 2);
        assert_eq!(
            inserts[0],
            format!(
                "INSERT INTO \"{}\" (\"id\", \"name\", \"amount\", \"date\") VALUES ('1', 'Alice', '120.5', '2025-04-01');",
                name
            )
        );
    }

    #[test]
    fn test_insert_escapes_single_quotes() {
        let mut ex = transactions_example();
        ex.table.rows = vec![vec![json!("3"), json!("O'Brien"), json!("10.0"), json!("2025-04-03")]];
        let inserts = generate_insert_sql(&ex, "ex_test");
        assert!(inserts[0].contains("'O''Brien'"));
    }

    #[test]
    fn test_insert_null_and_number_literals() {
        let mut ex = transactions_example();
        ex.table.rows = vec![vec![json!(4), json!(null), json!(12.5), json!("2025-04-04")]];
        let inserts = generate_insert_sql(&ex, "ex_test");
        assert!(inserts[0].contains("VALUES (4, NULL, 12.5, '2025-04-04');"));
    }

    #[test]
    fn test_sample_query_format() {
        assert_eq!(sample_query("ex_abc"), "SELECT * FROM \"ex_abc\" LIMIT 5;");
    }

    #[test]
    fn test_rewrite_replaces_standalone_word() {
        let sql = "SELECT COUNT(id) FROM table WHERE name = 'Alice'";
        assert_eq!(
            rewrite_table_token(sql, "ex_1"),
            "SELECT COUNT(id) FROM ex_1 WHERE name = 'Alice'"
        );
    }

    #[test]
    fn test_rewrite_skips_quoted_literals() {
        let sql = "SELECT * FROM table WHERE sport = 'table tennis'";
        assert_eq!(
            rewrite_table_token(sql, "ex_1"),
            "SELECT * FROM ex_1 WHERE sport = 'table tennis'"
        );
    }

    #[test]
    fn test_rewrite_skips_word_fragments() {
        let sql = "SELECT tabletop FROM timetable";
        assert_eq!(rewrite_table_token(sql, "ex_1"), sql);
    }

    #[test]
    fn test_rewrite_handles_escaped_quotes() {
        let sql = "SELECT * FROM table WHERE name = 'O''Brien table'";
        assert_eq!(
            rewrite_table_token(sql, "ex_1"),
            "SELECT * FROM ex_1 WHERE name = 'O''Brien table'"
        );
    }

    #[test]
    fn test_rewrite_replaces_every_occurrence() {
        let sql = "SELECT table.a FROM table";
        assert_eq!(rewrite_table_token(sql, "t9"), "SELECT t9.a FROM t9");
    }
}
