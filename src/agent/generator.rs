use crate::error::Result;

use super::openai::OpenAiBackend;
use super::prompt::render_prompt;

/// Completion service seam. Production uses the hosted chat API; tests
/// substitute a canned backend.
pub trait CompletionBackend {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Turns a question plus a schema rendering into a SQL query through
/// the completion service.
pub struct SqlGenerator {
    backend: Box<dyn CompletionBackend>,
}

impl SqlGenerator {
    /// Construct against the hosted service. Fails immediately when no
    /// credential is configured, before any request is made.
    pub fn new() -> Result<Self> {
        Ok(Self::with_backend(Box::new(OpenAiBackend::new()?)))
    }

    pub fn with_backend(backend: Box<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub fn generate(&self, question: &str, schema: &str) -> Result<String> {
        let prompt = render_prompt(question, schema);
        let raw = self.backend.complete(&prompt)?;
        Ok(trim_sql(&raw))
    }
}

/// Strip surrounding whitespace and the markdown fences the model
/// sometimes adds despite instructions.
pub fn trim_sql(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = if let Some(s) = trimmed.strip_prefix("```sql") {
        s
    } else if let Some(s) = trimmed.strip_prefix("```") {
        s
    } else {
        trimmed
    };
    inner.strip_suffix("```").unwrap_or(inner).trim().to_string()
}

/// Normalization used for exact-match comparison during evaluation:
/// lowercase, newlines to spaces, runs of whitespace collapsed.
pub fn normalize_sql(sql: &str) -> String {
    sql.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}
