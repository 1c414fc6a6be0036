use crate::schema::types::SchemaDocument;

/// Instruction template sent to the completion service. `{schema}` and
/// `{question}` are filled by `render_prompt`.
pub const PROMPT_TEMPLATE: &str = "
Based on the table schema below, write a SQL query that would answer the user's question.
Do not query for columns that are not in the schema.
Pay attention to the type of columns.
Output the SQL query ONLY, without any explanation or markdown formatting.

Schema:
{schema}

Question:
{question}

SQL Query:
";

pub fn render_prompt(question: &str, schema: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{schema}", schema)
        .replace("{question}", question)
}

/// Render a schema document as CREATE TABLE text for prompting.
pub fn schema_text(schema: &SchemaDocument) -> String {
    let mut blocks = Vec::new();

    for table in &schema.tables {
        let mut lines = Vec::new();
        for col in &table.columns {
            let mut line = format!("    \"{}\" {}", col.name, col.col_type);
            if col.is_primary_key {
                line.push_str(" PRIMARY KEY");
            } else if col.not_null {
                line.push_str(" NOT NULL");
            }
            lines.push(line);
        }
        for fk in &table.foreign_keys {
            lines.push(format!(
                "    FOREIGN KEY (\"{}\") REFERENCES \"{}\"(\"{}\")",
                fk.column, fk.referenced_table, fk.referenced_column
            ));
        }
        blocks.push(format!(
            "CREATE TABLE {} (\n{}\n);",
            table.name,
            lines.join(",\n")
        ));
    }

    blocks.join("\n\n")
}
