//! Source abstraction traits
//!
//! This module defines the contract a relational source must satisfy for the
//! change extractor and the related-row lookups.

use crate::core::checkpoint::SyncCursor;
use crate::domain::entity::{EntityKind, Relation};
use crate::domain::ids::RowId;
use crate::domain::row::{RelatedRow, SourceRow};
use crate::domain::Result;
use async_trait::async_trait;

/// Read-only access to the relational source
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Test the source connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Fetch rows of `kind` strictly after `cursor`
    ///
    /// Rows must come back ordered ascending by `(modified_at, id)` with ids
    /// compared as text, and there must be at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns a `Source` error if the query fails or a row cannot be decoded.
    async fn fetch_changed(
        &self,
        kind: EntityKind,
        cursor: &SyncCursor,
        limit: usize,
    ) -> Result<Vec<SourceRow>>;

    /// Look up related rows by key
    ///
    /// Keys with no matching row are simply absent from the result.
    async fn fetch_related(&self, relation: Relation, ids: &[RowId]) -> Result<Vec<RelatedRow>>;

    /// Human-readable description with credentials redacted
    fn describe(&self) -> String;
}
