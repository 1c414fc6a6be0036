use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Standardized description of a database schema. Serializes to the
/// JSON format consumed by the prompt builder and external tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub tables: Vec<TableSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub foreign_keys: Vec<ForeignKeyEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
    pub not_null: bool,
    pub is_primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyEdge {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl SchemaDocument {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, output_path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        fs::write(output_path, json)?;
        Ok(())
    }
}

/// Map a WikiSQL column type tag to its SQLite type. Unknown tags
/// fall back to TEXT; dates are stored as TEXT since SQLite has no
/// date type.
pub fn sqlite_type_for(tag: &str) -> &'static str {
    match tag.to_ascii_lowercase().as_str() {
        "number" => "INTEGER",
        "real" => "REAL",
        "text" | "date" => "TEXT",
        _ => "TEXT",
    }
}
