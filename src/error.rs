use thiserror::Error;

#[derive(Error, Debug)]
pub enum WikiSqlError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid example: {0}")]
    Validation(String),

    #[error("index {index} out of range for split '{split}' ({len} examples)")]
    OutOfRange {
        split: String,
        index: usize,
        len: usize,
    },

    #[error("dataset retrieval failed: {0}")]
    Retrieval(String),

    #[error("sql generation failed: {0}")]
    Generation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, WikiSqlError>;
