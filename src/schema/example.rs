use crate::dataset::example::Example;
use crate::error::Result;
use crate::schema::types::{sqlite_type_for, ColumnSchema, SchemaDocument, TableSchema};

/// Default table name when the example carries no table id. WikiSQL's
/// annotated SQL refers to every table by this name.
pub const DEFAULT_TABLE_NAME: &str = "table";

/// Build a `SchemaDocument` from one WikiSQL example, without
/// materializing anything. Values are never nullable in WikiSQL, and
/// the first column acts as primary key when its type tag is `number`.
/// The dataset carries no foreign keys.
pub fn schema_from_example(example: &Example) -> Result<SchemaDocument> {
    example.validate()?;

    let columns = example
        .table
        .header
        .iter()
        .zip(example.table.types.iter())
        .enumerate()
        .map(|(i, (header, tag))| ColumnSchema {
            name: header.clone(),
            col_type: sqlite_type_for(tag).to_string(),
            not_null: true,
            is_primary_key: i == 0 && tag.eq_ignore_ascii_case("number"),
        })
        .collect();

    let name = example
        .sql
        .table_id
        .clone()
        .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());

    Ok(SchemaDocument {
        tables: vec![TableSchema {
            name,
            columns,
            foreign_keys: Vec::new(),
        }],
    })
}
