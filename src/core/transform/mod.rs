//! Document transformation
//!
//! A transformer turns a batch of changed source rows plus their resolved
//! related rows into index documents. Building is pure: related rows are fetched
//! by the pipeline beforehand, so the same inputs always produce the same
//! documents. A row that cannot be built is returned as a skip instead of failing
//! the batch.
//!
//! Three document families are supported:
//!
//! - **movies**: film works with genres and credited persons
//! - **genres**: genre name and description
//! - **persons**: persons with the films they are credited on

pub mod fields;
pub mod genres;
pub mod movies;
pub mod persons;

use crate::core::extract::ChangeBatch;
use crate::domain::document::{DenormalizedDocument, SkippedRow, TransformOutcome};
use crate::domain::entity::EntityKind;
use crate::domain::row::{RelatedRows, SourceRow};
use crate::domain::{Result, SyncError};
use serde_json::Value;
use std::sync::Arc;

pub use genres::GenreTransformer;
pub use movies::MovieTransformer;
pub use persons::PersonTransformer;

/// Builds index documents for one entity kind
pub trait Transformer: Send + Sync {
    /// Kind of documents this transformer builds
    fn kind(&self) -> EntityKind;

    /// Build the document body for one row
    ///
    /// # Errors
    ///
    /// Returns a `DataShape` error if the row or one of its references is
    /// missing or malformed.
    fn build_body(&self, row: &SourceRow, related: &RelatedRows) -> Result<Value>;

    /// Build one outcome per row, in batch order
    fn build(&self, batch: &ChangeBatch, related: &RelatedRows) -> Vec<TransformOutcome> {
        batch
            .rows()
            .iter()
            .map(|row| match decodable(row).and_then(|row| self.build_body(row, related)) {
                Ok(body) => TransformOutcome::Document(DenormalizedDocument {
                    id: row.id.clone(),
                    version: row.modified_at.timestamp_micros(),
                    body,
                }),
                Err(e) => {
                    tracing::warn!(
                        kind = %self.kind(),
                        row_id = %row.id,
                        error = %e,
                        "Skipping row"
                    );
                    TransformOutcome::Skipped(SkippedRow {
                        id: row.id.clone(),
                        modified_at: row.modified_at,
                        reason: e.to_string(),
                    })
                }
            })
            .collect()
    }
}

/// Reject rows the source could not decode before building them
fn decodable(row: &SourceRow) -> Result<&SourceRow> {
    match &row.decode_error {
        Some(reason) => Err(SyncError::data_shape(row.id.as_str(), reason.as_str())),
        None => Ok(row),
    }
}

/// Transformer for an entity kind
pub fn transformer_for(kind: EntityKind) -> Arc<dyn Transformer> {
    match kind {
        EntityKind::Movies => Arc::new(MovieTransformer),
        EntityKind::Genres => Arc::new(GenreTransformer),
        EntityKind::Persons => Arc::new(PersonTransformer),
    }
}
