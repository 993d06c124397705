//! Elasticsearch bulk API wire types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Action line preceding each document in the NDJSON body
#[derive(Debug, Serialize)]
pub struct BulkAction<'a> {
    pub index: BulkActionMeta<'a>,
}

#[derive(Debug, Serialize)]
pub struct BulkActionMeta<'a> {
    #[serde(rename = "_index")]
    pub index: &'a str,
    #[serde(rename = "_id")]
    pub id: &'a str,
    pub version: i64,
    pub version_type: &'static str,
}

/// Top-level `_bulk` response
#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default)]
    pub errors: bool,
    pub items: Vec<HashMap<String, BulkItemResult>>,
}

/// Result for a single action, keyed by the action name in the response
#[derive(Debug, Deserialize)]
pub struct BulkItemResult {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub status: u16,
    #[serde(default)]
    pub error: Option<BulkItemError>,
}

#[derive(Debug, Deserialize)]
pub struct BulkItemError {
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl BulkItemError {
    pub fn describe(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{}: {}", self.error_type, reason),
            None => self.error_type.clone(),
        }
    }
}

/// Error body returned when the whole request is rejected
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: serde_json::Value,
    #[serde(default)]
    pub status: Option<u16>,
}
