//! Dead-letter ledger
//!
//! Rows the cursor moved past without indexing are appended here so an operator
//! can inspect and replay them. One JSON object per line, one file per entity.

use crate::domain::document::SkippedRow;
use crate::domain::ids::{EntityName, RowId};
use crate::domain::{Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

const LEDGER_SUFFIX: &str = ".dead-letter.jsonl";

/// Why a row was dead-lettered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterKind {
    /// The transformer could not build a document
    Skipped,
    /// The index rejected the document permanently
    LoadFailed,
}

/// One ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub entity: EntityName,
    pub row_id: RowId,
    pub modified_at: DateTime<Utc>,
    pub kind: DeadLetterKind,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

impl DeadLetter {
    pub fn skipped(entity: &EntityName, row: &SkippedRow) -> Self {
        Self {
            entity: entity.clone(),
            row_id: row.id.clone(),
            modified_at: row.modified_at,
            kind: DeadLetterKind::Skipped,
            reason: row.reason.clone(),
            recorded_at: Utc::now(),
        }
    }

    pub fn load_failed(
        entity: &EntityName,
        row_id: RowId,
        modified_at: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.clone(),
            row_id,
            modified_at,
            kind: DeadLetterKind::LoadFailed,
            reason: reason.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Destination for dead letters
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    /// Durably record a set of entries for one entity
    ///
    /// # Errors
    ///
    /// Returns an error if the entries could not be made durable; the caller
    /// must not advance its cursor past them in that case.
    async fn record(&self, entity: &EntityName, letters: &[DeadLetter]) -> Result<()>;
}

/// Append-only JSONL ledger at `<dir>/<entity>.dead-letter.jsonl`
#[derive(Debug, Clone)]
pub struct FileDeadLetterLedger {
    dir: PathBuf,
}

impl FileDeadLetterLedger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, entity: &EntityName) -> PathBuf {
        self.dir.join(format!("{}{}", entity.as_str(), LEDGER_SUFFIX))
    }
}

#[async_trait]
impl DeadLetterSink for FileDeadLetterLedger {
    async fn record(&self, entity: &EntityName, letters: &[DeadLetter]) -> Result<()> {
        if letters.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::new();
        for letter in letters {
            serde_json::to_writer(&mut buf, letter)?;
            buf.push(b'\n');
        }

        let path = self.path_for(entity);
        let ledger_error = |e: std::io::Error| {
            SyncError::Checkpoint(format!(
                "Failed to append dead letters to {}: {}",
                path.display(),
                e
            ))
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(ledger_error)?;
        file.write_all(&buf).await.map_err(ledger_error)?;
        file.sync_all().await.map_err(ledger_error)?;

        tracing::warn!(
            entity = %entity,
            count = letters.len(),
            path = %path.display(),
            "Recorded dead letters"
        );
        Ok(())
    }
}
