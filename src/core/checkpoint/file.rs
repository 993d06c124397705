//! File-backed checkpoint store
//!
//! Stores one JSON record per entity under a configured directory. Saves go
//! through a temp file in the same directory which is fsynced, renamed over the
//! target, and followed by an fsync of the directory itself.

use super::cursor::SyncCursor;
use super::record::CheckpointRecord;
use super::store::{CheckpointStatus, CheckpointStore};
use crate::domain::ids::EntityName;
use crate::domain::{Result, SyncError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const CHECKPOINT_SUFFIX: &str = ".checkpoint.json";

/// Checkpoint store writing `<dir>/<entity>.checkpoint.json`
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Open the store, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            SyncError::Checkpoint(format!(
                "Failed to create checkpoint directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        tracing::debug!(path = %dir.display(), "Opened checkpoint store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of an entity's checkpoint file
    pub fn path_for(&self, entity: &EntityName) -> PathBuf {
        self.dir.join(format!("{}{}", entity.as_str(), CHECKPOINT_SUFFIX))
    }

    fn temp_path_for(&self, entity: &EntityName) -> PathBuf {
        self.dir
            .join(format!(".{}{}.tmp", entity.as_str(), CHECKPOINT_SUFFIX))
    }

    async fn read_record(&self, entity: &EntityName) -> Result<Option<CheckpointRecord>> {
        let path = self.path_for(entity);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SyncError::Checkpoint(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let record: CheckpointRecord = serde_json::from_slice(&bytes).map_err(|e| {
            SyncError::corruption(entity.as_str(), format!("unparseable record: {e}"))
        })?;

        Ok(Some(record))
    }

    async fn write_atomically(&self, entity: &EntityName, contents: &[u8]) -> Result<()> {
        let target = self.path_for(entity);
        let temp = self.temp_path_for(entity);
        let durability = |stage: &str, e: std::io::Error| {
            SyncError::Checkpoint(format!(
                "Failed to {} checkpoint for '{}': {}",
                stage, entity, e
            ))
        };

        let mut file = tokio::fs::File::create(&temp)
            .await
            .map_err(|e| durability("create temp file for", e))?;
        file.write_all(contents)
            .await
            .map_err(|e| durability("write", e))?;
        file.sync_all().await.map_err(|e| durability("fsync", e))?;
        drop(file);

        tokio::fs::rename(&temp, &target)
            .await
            .map_err(|e| durability("rename", e))?;

        sync_dir(&self.dir).await
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self, entity: &EntityName) -> Result<SyncCursor> {
        match self.read_record(entity).await? {
            Some(record) => {
                let cursor = record.verify(entity)?;
                tracing::debug!(
                    entity = %entity,
                    cursor = %cursor,
                    sequence = record.sequence,
                    "Loaded checkpoint"
                );
                Ok(cursor)
            }
            None => {
                tracing::debug!(entity = %entity, "No checkpoint found, starting from epoch zero");
                Ok(SyncCursor::epoch_zero(entity.clone()))
            }
        }
    }

    async fn save(&self, cursor: &SyncCursor) -> Result<CheckpointRecord> {
        let entity = &cursor.entity;

        let sequence = match self.read_record(entity).await? {
            Some(existing) => {
                let stored = existing.verify(entity)?;
                if cursor.precedes(&stored) {
                    return Err(SyncError::CheckpointRegression {
                        entity: entity.to_string(),
                        attempted: cursor.to_string(),
                        stored: stored.to_string(),
                    });
                }
                existing.sequence + 1
            }
            None => 1,
        };

        let record = CheckpointRecord::seal(cursor, sequence);
        let contents = serde_json::to_vec_pretty(&record)?;
        self.write_atomically(entity, &contents).await?;

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<CheckpointStatus>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SyncError::Checkpoint(format!(
                    "Failed to list {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut statuses = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(stem) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(CHECKPOINT_SUFFIX))
            else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }

            let status = match EntityName::new(stem) {
                Ok(entity) => match self.read_record(&entity).await {
                    Ok(Some(record)) => match record.verify(&entity) {
                        Ok(_) => CheckpointStatus::Valid(record),
                        Err(e) => CheckpointStatus::Corrupt {
                            entity: stem.to_string(),
                            reason: e.to_string(),
                        },
                    },
                    Ok(None) => continue,
                    Err(e) => CheckpointStatus::Corrupt {
                        entity: stem.to_string(),
                        reason: e.to_string(),
                    },
                },
                Err(reason) => CheckpointStatus::Corrupt {
                    entity: stem.to_string(),
                    reason,
                },
            };
            statuses.push(status);
        }

        statuses.sort_by(|a, b| a.entity().cmp(b.entity()));
        Ok(statuses)
    }

    async fn reset(&self, entity: &EntityName) -> Result<bool> {
        match tokio::fs::remove_file(self.path_for(entity)).await {
            Ok(()) => {
                sync_dir(&self.dir).await?;
                tracing::info!(entity = %entity, "Checkpoint reset");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SyncError::Checkpoint(format!(
                "Failed to remove checkpoint for '{}': {}",
                entity, e
            ))),
        }
    }
}

/// fsync a directory so a completed rename survives power loss
async fn sync_dir(dir: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || std::fs::File::open(&dir)?.sync_all())
            .await
            .map_err(|e| SyncError::Checkpoint(format!("Directory sync task failed: {e}")))?
            .map_err(|e| SyncError::Checkpoint(format!("Failed to fsync directory: {e}")))?;
    }
    #[cfg(not(unix))]
    let _ = dir;

    Ok(())
}
