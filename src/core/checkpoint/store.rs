//! Checkpoint storage abstraction

use super::cursor::SyncCursor;
use super::record::CheckpointRecord;
use crate::domain::ids::EntityName;
use crate::domain::Result;
use async_trait::async_trait;

/// State of one stored checkpoint, as reported by [`CheckpointStore::list`]
#[derive(Debug, Clone)]
pub enum CheckpointStatus {
    /// Record passed its integrity check
    Valid(CheckpointRecord),
    /// Record exists but cannot be trusted
    Corrupt { entity: String, reason: String },
}

impl CheckpointStatus {
    pub fn entity(&self) -> &str {
        match self {
            CheckpointStatus::Valid(record) => &record.entity,
            CheckpointStatus::Corrupt { entity, .. } => entity,
        }
    }
}

/// Durable per-entity cursor storage
///
/// Implementations must make `save` crash-atomic: after a crash, `load`
/// returns either the previous cursor or the new one, never a mix.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the cursor for an entity
    ///
    /// Returns the epoch-zero cursor for an entity that has never been saved.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointCorruption` if a stored record fails verification.
    async fn load(&self, entity: &EntityName) -> Result<SyncCursor>;

    /// Persist a cursor, returning the record that was written
    ///
    /// # Errors
    ///
    /// Returns `CheckpointRegression` if `cursor` precedes the stored cursor, or
    /// `Checkpoint` if the write could not be made durable.
    async fn save(&self, cursor: &SyncCursor) -> Result<CheckpointRecord>;

    /// List every stored checkpoint, sorted by entity
    async fn list(&self) -> Result<Vec<CheckpointStatus>>;

    /// Delete an entity's checkpoint
    ///
    /// Returns `true` if a record existed.
    async fn reset(&self, entity: &EntityName) -> Result<bool>;
}
