//! Search index abstraction traits

use crate::domain::document::DenormalizedDocument;
use crate::domain::ids::RowId;
use crate::domain::Result;
use async_trait::async_trait;

/// Per-document result of one bulk submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemStatus {
    /// Document ID
    pub id: RowId,

    /// HTTP status reported for this item
    pub status: u16,

    /// Error type and reason, when the item failed
    pub error: Option<String>,
}

impl BulkItemStatus {
    pub fn ok(id: RowId) -> Self {
        Self {
            id,
            status: 200,
            error: None,
        }
    }

    pub fn failed(id: RowId, status: u16, error: impl Into<String>) -> Self {
        Self {
            id,
            status,
            error: Some(error.into()),
        }
    }
}

/// Write access to the search index
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Check that the cluster is reachable
    async fn ping(&self) -> Result<()>;

    /// Upsert documents into `index` in one request
    ///
    /// Returns one status per input document, in input order. Each document is
    /// written with its `version` under external versioning, so replaying an
    /// older version is reported as a 409 conflict rather than overwriting.
    ///
    /// # Errors
    ///
    /// Returns an `Index` error when the submission as a whole fails; per-item
    /// failures are reported through the statuses instead.
    async fn bulk_upsert(
        &self,
        index: &str,
        documents: &[DenormalizedDocument],
    ) -> Result<Vec<BulkItemStatus>>;

    /// Cluster endpoint, without credentials
    fn endpoint(&self) -> String;
}
