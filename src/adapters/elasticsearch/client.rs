//! Elasticsearch client implementation
//!
//! Talks to the `_bulk` endpoint with NDJSON bodies. Documents are written with
//! `version_type = external_gte`, keyed by the source modification time, so a
//! replayed batch never overwrites newer data.

use crate::adapters::elasticsearch::models::{
    BulkAction, BulkActionMeta, BulkResponse, ErrorResponse,
};
use crate::adapters::index::{BulkItemStatus, IndexClient};
use crate::config::schema::IndexConfig;
use crate::domain::document::DenormalizedDocument;
use crate::domain::{IndexError, Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

const VERSION_TYPE: &str = "external_gte";

/// Elasticsearch client for searchsync
pub struct ElasticsearchClient {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<crate::config::SecretString>,
}

impl ElasticsearchClient {
    /// Create a new Elasticsearch client
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let mut base = config.url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| {
            SyncError::Configuration(format!("Invalid index URL '{}': {}", config.url, e))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.request_timeout_seconds.min(30)))
            .build()
            .map_err(|e| {
                SyncError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            SyncError::Configuration(format!("Invalid index path '{}': {}", path, e))
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(
                username,
                self.password
                    .as_ref()
                    .map(|p| p.expose_secret().as_ref().to_string()),
            ),
            None => request,
        }
    }

    /// Serialize documents as a `_bulk` NDJSON body
    pub fn bulk_body(index: &str, documents: &[DenormalizedDocument]) -> Result<String> {
        let mut body = String::new();
        for doc in documents {
            let action = BulkAction {
                index: BulkActionMeta {
                    index,
                    id: doc.id.as_str(),
                    version: doc.version,
                    version_type: VERSION_TYPE,
                },
            };
            body.push_str(&serde_json::to_string(&action)?);
            body.push('\n');
            body.push_str(&serde_json::to_string(&doc.body)?);
            body.push('\n');
        }
        Ok(body)
    }
}

fn map_transport_error(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        IndexError::Timeout(e.to_string()).into()
    } else {
        IndexError::ConnectionFailed(e.to_string()).into()
    }
}

fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => match parsed.error {
            serde_json::Value::Object(map) => {
                let kind = map.get("type").and_then(|v| v.as_str()).unwrap_or("error");
                let reason = map.get("reason").and_then(|v| v.as_str()).unwrap_or("");
                format!("{kind}: {reason}")
            }
            other => other.to_string(),
        },
        Err(_) => body.chars().take(512).collect(),
    }
}

#[async_trait]
impl IndexClient for ElasticsearchClient {
    async fn ping(&self) -> Result<()> {
        let request = self.authorize(self.client.get(self.url("")?));
        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::RequestFailed {
                status: status.as_u16(),
                message: describe_error_body(&body),
            }
            .into());
        }

        tracing::info!(endpoint = %self.endpoint(), "Elasticsearch connection test successful");
        Ok(())
    }

    async fn bulk_upsert(
        &self,
        index: &str,
        documents: &[DenormalizedDocument],
    ) -> Result<Vec<BulkItemStatus>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let body = Self::bulk_body(index, documents)?;
        let request = self
            .authorize(self.client.post(self.url("_bulk")?))
            .header("Content-Type", "application/x-ndjson")
            .body(body);

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::RequestFailed {
                status: status.as_u16(),
                message: describe_error_body(&body),
            }
            .into());
        }

        let parsed: BulkResponse = response
            .json()
            .await
            .map_err(|e| IndexError::InvalidResponse(format!("Malformed bulk response: {e}")))?;

        if parsed.items.len() != documents.len() {
            return Err(IndexError::InvalidResponse(format!(
                "Bulk response has {} items for {} documents",
                parsed.items.len(),
                documents.len()
            ))
            .into());
        }

        let mut statuses = Vec::with_capacity(documents.len());
        for (doc, mut item) in documents.iter().zip(parsed.items) {
            let result = item.remove("index").ok_or_else(|| {
                IndexError::InvalidResponse(format!(
                    "Bulk response item for document {} has no 'index' entry",
                    doc.id
                ))
            })?;

            if let Some(id) = &result.id {
                if id != doc.id.as_str() {
                    return Err(IndexError::InvalidResponse(format!(
                        "Bulk response out of order: expected {}, got {}",
                        doc.id, id
                    ))
                    .into());
                }
            }

            statuses.push(BulkItemStatus {
                id: doc.id.clone(),
                status: result.status,
                error: result.error.map(|e| e.describe()),
            });
        }

        tracing::debug!(
            index = %index,
            documents = documents.len(),
            took_ms = parsed.took,
            errors = parsed.errors,
            "Bulk request completed"
        );

        Ok(statuses)
    }

    fn endpoint(&self) -> String {
        let mut url = self.base_url.clone();
        // Credentials embedded in the URL are never shown
        let _ = url.set_username("");
        let _ = url.set_password(None);
        url.to_string()
    }
}
