use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, WikiSqlError};

/// One WikiSQL example: a natural-language question, the table it is
/// asked against, and the annotated target SQL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    /// Dataset identifier. The provider sometimes serves this as a
    /// number, so it is canonicalized to a string on the way in.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,

    pub question: String,

    pub table: ExampleTable,

    #[serde(default)]
    pub sql: SqlAnnotation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExampleTable {
    #[serde(default)]
    pub header: Vec<String>,

    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlAnnotation {
    #[serde(default)]
    pub human_readable: Option<String>,

    #[serde(default)]
    pub table_id: Option<String>,

    #[serde(default)]
    pub sel: Option<i64>,

    #[serde(default)]
    pub agg: Option<i64>,

    #[serde(default)]
    pub conds: Option<Value>,
}

impl Example {
    /// Check the structural invariants the converters rely on: header
    /// and types are present, parallel, and every row matches the
    /// header width.
    pub fn validate(&self) -> Result<()> {
        if self.table.header.is_empty() {
            return Err(WikiSqlError::Validation(
                "example table is missing 'header'".into(),
            ));
        }
        if self.table.types.is_empty() {
            return Err(WikiSqlError::Validation(
                "example table is missing 'types'".into(),
            ));
        }
        if self.table.header.len() != self.table.types.len() {
            return Err(WikiSqlError::Validation(format!(
                "table has {} header entries but {} types",
                self.table.header.len(),
                self.table.types.len()
            )));
        }
        for (i, row) in self.table.rows.iter().enumerate() {
            if row.len() != self.table.header.len() {
                return Err(WikiSqlError::Validation(format!(
                    "row {} has {} values but the table has {} columns",
                    i,
                    row.len(),
                    self.table.header.len()
                )));
            }
        }
        Ok(())
    }
}

/// Accept string, integer, or float ids. Floats keep only the integer
/// part, matching how the identifiers were written before the provider
/// started re-typing them.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i.to_string()))
            } else if let Some(u) = n.as_u64() {
                Ok(Some(u.to_string()))
            } else if let Some(f) = n.as_f64() {
                Ok(Some(format!("{}", f.trunc() as i64)))
            } else {
                Ok(Some(n.to_string()))
            }
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "id must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Example {
        serde_json::from_str(json).expect("example should parse")
    }

    #[test]
    fn test_string_id_kept() {
        let ex = parse(r#"{"id": "1-1000181-1", "question": "q", "table": {"header": ["a"], "types": ["text"], "rows": []}}"#);
        assert_eq!(ex.id.as_deref(), Some("1-1000181-1"));
    }

    #[test]
    fn test_numeric_id_canonicalized() {
        let ex = parse(r#"{"id": 42, "question": "q", "table": {"header": ["a"], "types": ["text"], "rows": []}}"#);
        assert_eq!(ex.id.as_deref(), Some("42"));
    }

    #[test]
    fn test_float_id_drops_fraction() {
        let ex = parse(r#"{"id": 88.7, "question": "q", "table": {"header": ["a"], "types": ["text"], "rows": []}}"#);
        assert_eq!(ex.id.as_deref(), Some("88"));
    }

    #[test]
    fn test_missing_id_is_none() {
        let ex = parse(r#"{"question": "q", "table": {"header": ["a"], "types": ["text"], "rows": []}}"#);
        assert!(ex.id.is_none());
    }

    #[test]
    fn test_validate_accepts_consistent_table() {
        let ex = parse(
            r#"{"question": "q", "table": {"header": ["a", "b"], "types": ["text", "number"], "rows": [["x", "1"]]}}"#,
        );
        assert!(ex.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_header() {
        let ex = parse(r#"{"question": "q", "table": {"types": ["text"], "rows": []}}"#);
        let err = ex.validate().unwrap_err();
        assert!(err.to_string().contains("header"));
    }

    #[test]
    fn test_validate_rejects_header_types_mismatch() {
        let ex = parse(
            r#"{"question": "q", "table": {"header": ["a", "b"], "types": ["text"], "rows": []}}"#,
        );
        let err = ex.validate().unwrap_err();
        assert!(err.to_string().contains("2 header entries but 1 types"));
    }

    #[test]
    fn test_validate_rejects_ragged_row() {
        let ex = parse(
            r#"{"question": "q", "table": {"header": ["a", "b"], "types": ["text", "text"], "rows": [["only one"]]}}"#,
        );
        let err = ex.validate().unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn test_round_trip_through_jsonl() {
        let ex = parse(
            r#"{"id": 7, "question": "who?", "table": {"header": ["name"], "types": ["text"], "rows": [["Alice"]]}, "sql": {"human_readable": "SELECT name FROM table"}}"#,
        );
        let line = serde_json::to_string(&ex).unwrap();
        let back: Example = serde_json::from_str(&line).unwrap();
        assert_eq!(back.id.as_deref(), Some("7"));
        assert_eq!(back.question, "who?");
        assert_eq!(back.sql.human_readable.as_deref(), Some("SELECT name FROM table"));
    }
}
