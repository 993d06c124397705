//! Persisted checkpoint record
//!
//! The on-disk form of a [`SyncCursor`], carrying a save sequence number and a
//! checksum so that a damaged or hand-edited file is detected instead of
//! silently rewinding or skipping data.

use super::cursor::SyncCursor;
use crate::domain::ids::{EntityName, RowId};
use crate::domain::{Result, SyncError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Checkpoint record as stored in `<entity>.checkpoint.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Entity name; must match the file name
    pub entity: String,

    /// Modification time of the last processed row
    pub watermark_timestamp: DateTime<Utc>,

    /// Key of the last processed row
    pub watermark_id: String,

    /// Number of saves for this entity since the last reset
    pub sequence: u64,

    /// Wall-clock time of the save
    pub updated_at: DateTime<Utc>,

    /// SHA-256 over entity, position and sequence
    pub checksum: String,
}

impl CheckpointRecord {
    /// Build a sealed record for `cursor`
    pub fn seal(cursor: &SyncCursor, sequence: u64) -> Self {
        let entity = cursor.entity.as_str().to_string();
        let watermark_id = cursor.watermark_id.as_str().to_string();
        let checksum = compute_checksum(
            &entity,
            &cursor.watermark_timestamp,
            &watermark_id,
            sequence,
        );

        Self {
            entity,
            watermark_timestamp: cursor.watermark_timestamp,
            watermark_id,
            sequence,
            updated_at: Utc::now(),
            checksum,
        }
    }

    /// Check integrity and return the cursor this record holds
    ///
    /// # Errors
    ///
    /// Returns `CheckpointCorruption` if the record belongs to another entity,
    /// carries an invalid name, or fails its checksum.
    pub fn verify(&self, expected: &EntityName) -> Result<SyncCursor> {
        if self.entity != expected.as_str() {
            return Err(SyncError::corruption(
                expected.as_str(),
                format!("record belongs to entity '{}'", self.entity),
            ));
        }

        let computed = compute_checksum(
            &self.entity,
            &self.watermark_timestamp,
            &self.watermark_id,
            self.sequence,
        );
        if computed != self.checksum {
            return Err(SyncError::corruption(
                expected.as_str(),
                format!(
                    "checksum mismatch (stored {}, computed {})",
                    self.checksum, computed
                ),
            ));
        }

        let watermark_id = if self.watermark_id.is_empty() {
            RowId::min()
        } else {
            RowId::new(self.watermark_id.clone())
                .map_err(|e| SyncError::corruption(expected.as_str(), e))?
        };

        Ok(SyncCursor::new(
            expected.clone(),
            self.watermark_timestamp,
            watermark_id,
        ))
    }
}

/// Hex SHA-256 of `entity|timestamp|id|sequence`
pub fn compute_checksum(
    entity: &str,
    timestamp: &DateTime<Utc>,
    watermark_id: &str,
    sequence: u64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entity.as_bytes());
    hasher.update(b"|");
    hasher.update(
        timestamp
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );
    hasher.update(b"|");
    hasher.update(watermark_id.as_bytes());
    hasher.update(b"|");
    hasher.update(sequence.to_string().as_bytes());

    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
