use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::generator::CompletionBackend;
use crate::config;
use crate::error::{Result, WikiSqlError};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions backend. Deterministic settings: fixed model,
/// temperature 0.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new() -> Result<Self> {
        let api_key = config::openai_api_key()?;
        let client = Client::builder()
            .user_agent("wikisql-to-sqlite")
            .build()?;
        Ok(Self { client, api_key })
    }
}

impl CompletionBackend for OpenAiBackend {
    fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| WikiSqlError::Generation(format!("completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(WikiSqlError::Generation(format!(
                "completion service returned {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| WikiSqlError::Generation(format!("invalid completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| WikiSqlError::Generation("completion response had no choices".into()))
    }
}
