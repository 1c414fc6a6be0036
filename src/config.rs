use std::env;
use std::path::PathBuf;

use crate::error::{Result, WikiSqlError};

/// Environment variable holding the completion service credential.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Environment variable holding the optional dataset provider token.
pub const HF_AUTH_TOKEN: &str = "HUGGING_FACE_AUTH_TOKEN";

/// Environment variable overriding the data root directory.
pub const DATA_ROOT: &str = "WIKISQL_DATA_ROOT";

/// Resolve the data root: CLI flag wins, then the environment
/// variable, then `./data`.
pub fn resolve_data_root(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Ok(dir) = env::var(DATA_ROOT) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from("data")
}

/// Completion service credential. Absence is a hard configuration
/// error so callers fail before any network work.
pub fn openai_api_key() -> Result<String> {
    match env::var(OPENAI_API_KEY) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(WikiSqlError::Config(format!(
            "{} is not set; SQL generation requires a completion service credential",
            OPENAI_API_KEY
        ))),
    }
}

/// Optional bearer token for the dataset provider.
pub fn hf_auth_token() -> Option<String> {
    env::var(HF_AUTH_TOKEN).ok().filter(|t| !t.is_empty())
}
