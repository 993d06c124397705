//! Checkpoint manager
//!
//! Thin layer over a [`CheckpointStore`] used by the sync pipelines. It owns the
//! dry-run switch so pipelines never have to special-case persistence.

use super::cursor::SyncCursor;
use super::record::CheckpointRecord;
use super::store::{CheckpointStatus, CheckpointStore};
use crate::domain::ids::EntityName;
use crate::domain::Result;
use std::sync::Arc;

/// Checkpoint manager for per-entity cursors
pub struct CheckpointManager {
    store: Arc<dyn CheckpointStore>,
    dry_run: bool,
}

impl CheckpointManager {
    /// Create a new CheckpointManager
    ///
    /// # Arguments
    ///
    /// * `store` - Checkpoint storage implementation
    /// * `dry_run` - If true, checkpoints are logged but not written
    pub fn new(store: Arc<dyn CheckpointStore>, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Load the cursor an entity resumes from
    pub async fn load(&self, entity: &EntityName) -> Result<SyncCursor> {
        self.store.load(entity).await
    }

    /// Checkpoint a processed batch by persisting its advanced cursor
    ///
    /// Returns `None` in dry-run mode, where nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects or fails the save.
    pub async fn checkpoint_batch(
        &self,
        cursor: &SyncCursor,
        batch_size: usize,
    ) -> Result<Option<CheckpointRecord>> {
        if self.dry_run {
            tracing::info!(
                entity = %cursor.entity,
                cursor = %cursor,
                batch_size,
                "DRY RUN: Would persist checkpoint"
            );
            return Ok(None);
        }

        let record = self.store.save(cursor).await?;
        tracing::info!(
            entity = %cursor.entity,
            cursor = %cursor,
            sequence = record.sequence,
            batch_size,
            "Checkpointed batch"
        );
        Ok(Some(record))
    }

    pub async fn list(&self) -> Result<Vec<CheckpointStatus>> {
        self.store.list().await
    }

    pub async fn reset(&self, entity: &EntityName) -> Result<bool> {
        self.store.reset(entity).await
    }
}
