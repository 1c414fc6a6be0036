use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::dataset::splits::Split;
use crate::error::{Result, WikiSqlError};

const ROWS_URL: &str = "https://datasets-server.huggingface.co/rows";
const SIZE_URL: &str = "https://datasets-server.huggingface.co/size";

const DATASET: &str = "Salesforce/wikisql";
const CONFIG: &str = "default";

/// Largest page the rows endpoint will serve.
pub const MAX_PAGE_LENGTH: usize = 100;

/// One page of rows from the dataset provider.
#[derive(Debug, Deserialize)]
pub struct RowsPage {
    pub rows: Vec<RowItem>,
    pub num_rows_total: u64,
}

#[derive(Debug, Deserialize)]
pub struct RowItem {
    pub row_idx: u64,
    pub row: Value,
}

#[derive(Debug, Deserialize)]
struct SizeResponse {
    size: SizeInfo,
}

#[derive(Debug, Deserialize)]
struct SizeInfo {
    splits: Vec<SplitSize>,
}

#[derive(Debug, Deserialize)]
struct SplitSize {
    split: String,
    num_rows: u64,
}

/// Blocking HTTP client for the hosted WikiSQL rows API.
pub struct DatasetClient {
    client: Client,
    auth_token: Option<String>,
}

impl DatasetClient {
    pub fn new(auth_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("wikisql-to-sqlite")
            .build()?;
        Ok(Self { client, auth_token })
    }

    /// Fetch one page of rows for a split. `length` is clamped to the
    /// provider's page maximum.
    pub fn fetch_rows(&self, split: Split, offset: u64, length: usize) -> Result<RowsPage> {
        let length = length.min(MAX_PAGE_LENGTH);
        let offset = offset.to_string();
        let length = length.to_string();
        let mut request = self.client.get(ROWS_URL).query(&[
            ("dataset", DATASET),
            ("config", CONFIG),
            ("split", split.provider_name()),
            ("offset", offset.as_str()),
            ("length", length.as_str()),
        ]);

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| WikiSqlError::Retrieval(format!("rows request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikiSqlError::Retrieval(format!(
                "provider returned {} for split '{}' at offset {}",
                status, split, offset
            )));
        }

        response
            .json::<RowsPage>()
            .map_err(|e| WikiSqlError::Retrieval(format!("invalid rows response: {}", e)))
    }

    /// Number of rows the provider reports for a split.
    pub fn fetch_split_size(&self, split: Split) -> Result<u64> {
        let mut request = self
            .client
            .get(SIZE_URL)
            .query(&[("dataset", DATASET), ("config", CONFIG)]);

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| WikiSqlError::Retrieval(format!("size request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikiSqlError::Retrieval(format!(
                "provider returned {} for size request",
                status
            )));
        }

        let info = response
            .json::<SizeResponse>()
            .map_err(|e| WikiSqlError::Retrieval(format!("invalid size response: {}", e)))?;

        info.size
            .splits
            .iter()
            .find(|s| s.split == split.provider_name())
            .map(|s| s.num_rows)
            .ok_or_else(|| {
                WikiSqlError::Retrieval(format!("provider reported no size for split '{}'", split))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_page_deserializes() {
        let json = r#"{
            "features": [{"feature_idx": 0, "name": "question", "type": {"dtype": "string"}}],
            "rows": [
                {"row_idx": 0, "row": {"question": "q0"}, "truncated_cells": []},
                {"row_idx": 1, "row": {"question": "q1"}, "truncated_cells": []}
            ],
            "num_rows_total": 8421,
            "num_rows_per_page": 100
        }"#;
        let page: RowsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[1].row_idx, 1);
        assert_eq!(page.num_rows_total, 8421);
    }

    #[test]
    fn test_size_response_deserializes() {
        let json = r#"{
            "size": {
                "dataset": {"dataset": "Salesforce/wikisql", "num_rows": 80654},
                "splits": [
                    {"dataset": "Salesforce/wikisql", "config": "default", "split": "train", "num_rows": 56355},
                    {"dataset": "Salesforce/wikisql", "config": "default", "split": "validation", "num_rows": 8421}
                ]
            }
        }"#;
        let parsed: SizeResponse = serde_json::from_str(json).unwrap();
        let dev = parsed
            .size
            .splits
            .iter()
            .find(|s| s.split == Split::Dev.provider_name())
            .unwrap();
        assert_eq!(dev.num_rows, 8421);
    }
}
