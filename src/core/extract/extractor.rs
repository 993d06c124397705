//! Change extractor
//!
//! Polls the source for rows changed after a cursor and packages them into a
//! validated [`ChangeBatch`]. Read-only.

use super::batch::ChangeBatch;
use crate::adapters::source::SourceClient;
use crate::core::checkpoint::SyncCursor;
use crate::domain::entity::EntityKind;
use crate::domain::{Result, SyncError};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one poll
#[derive(Debug)]
pub enum PollResult {
    /// At least one changed row
    Batch(ChangeBatch),
    /// Caught up; nothing after the cursor
    Empty,
}

/// Change extractor bound to one source
#[derive(Clone)]
pub struct ChangeExtractor {
    source: Arc<dyn SourceClient>,
    timeout: Duration,
}

impl ChangeExtractor {
    pub fn new(source: Arc<dyn SourceClient>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Fetch the next page of changes after `cursor`
    ///
    /// # Errors
    ///
    /// Returns `TransientConnection` if the poll exceeds its deadline, and the
    /// source's error if the query fails or the rows break the ordering contract.
    pub async fn poll(
        &self,
        kind: EntityKind,
        cursor: &SyncCursor,
        limit: usize,
    ) -> Result<PollResult> {
        let rows = tokio::time::timeout(self.timeout, self.source.fetch_changed(kind, cursor, limit))
            .await
            .map_err(|_| {
                SyncError::TransientConnection(format!(
                    "poll for '{}' timed out after {}s",
                    cursor.entity,
                    self.timeout.as_secs()
                ))
            })??;

        if rows.is_empty() {
            return Ok(PollResult::Empty);
        }

        Ok(PollResult::Batch(ChangeBatch::new(
            cursor.clone(),
            rows,
            limit,
        )?))
    }

    pub fn source(&self) -> &Arc<dyn SourceClient> {
        &self.source
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
