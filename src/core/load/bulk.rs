//! Bulk loading with per-document retry
//!
//! Documents are submitted together and each one gets its own outcome. Only
//! documents whose last attempt ended in a retryable status are resubmitted, so
//! documents that already succeeded are never written twice in one load.

use crate::adapters::index::{BulkItemStatus, IndexClient};
use crate::config::RetryConfig;
use crate::domain::document::{DenormalizedDocument, LoadOutcome};
use crate::domain::{IndexError, Result, SyncError};
use std::sync::Arc;
use std::time::Duration;

/// How a single bulk item status is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClass {
    Success,
    Retryable,
    Permanent,
}

/// Classify one bulk item status code
///
/// A 409 means the index already holds this or a newer version of the
/// document, which is the state a successful write would leave behind.
pub fn classify(status: u16) -> ItemClass {
    match status {
        200..=299 | 409 => ItemClass::Success,
        429 | 500..=599 => ItemClass::Retryable,
        _ => ItemClass::Permanent,
    }
}

fn describe(status: &BulkItemStatus) -> String {
    match &status.error {
        Some(error) => format!("status {}: {}", status.status, error),
        None => format!("status {}", status.status),
    }
}

/// Loads document batches into one index client
pub struct BulkLoader {
    client: Arc<dyn IndexClient>,
    retry: RetryConfig,
    timeout: Duration,
    dry_run: bool,
}

impl BulkLoader {
    pub fn new(client: Arc<dyn IndexClient>, retry: RetryConfig, timeout: Duration) -> Self {
        Self {
            client,
            retry,
            timeout,
            dry_run: false,
        }
    }

    /// Report every document as loaded without contacting the index
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Load documents into `index`
    ///
    /// Returns one outcome per document, in input order. Every outcome is
    /// terminal: documents still retryable after `max_attempts` submissions
    /// are reported as permanent failures.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Unavailable` if the last allowed submission failed
    /// at the transport level, and any non-transient submission error
    /// immediately. No outcomes are reported in either case.
    pub async fn load(
        &self,
        index: &str,
        documents: &[DenormalizedDocument],
    ) -> Result<Vec<LoadOutcome>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        if self.dry_run {
            tracing::info!(
                index = index,
                count = documents.len(),
                "DRY RUN: Would upsert documents"
            );
            return Ok(vec![LoadOutcome::Success; documents.len()]);
        }

        let max_attempts = self.retry.max_attempts.max(1);
        let mut backoff = self.retry.backoff();
        let mut outcomes = vec![LoadOutcome::RetryableFailure(String::new()); documents.len()];
        let mut pending: Vec<usize> = (0..documents.len()).collect();

        for attempt in 1..=max_attempts {
            let batch: Vec<DenormalizedDocument> =
                pending.iter().map(|&i| documents[i].clone()).collect();

            match self.submit(index, &batch).await {
                Ok(statuses) => {
                    if statuses.len() != batch.len() {
                        return Err(IndexError::InvalidResponse(format!(
                            "expected {} item statuses, got {}",
                            batch.len(),
                            statuses.len()
                        ))
                        .into());
                    }

                    let mut still_pending = Vec::new();
                    for (&i, status) in pending.iter().zip(&statuses) {
                        outcomes[i] = match classify(status.status) {
                            ItemClass::Success => LoadOutcome::Success,
                            ItemClass::Permanent => LoadOutcome::PermanentFailure(describe(status)),
                            ItemClass::Retryable => {
                                still_pending.push(i);
                                LoadOutcome::RetryableFailure(describe(status))
                            }
                        };
                    }
                    pending = still_pending;
                }
                Err(e) if e.is_transient() => {
                    if attempt == max_attempts {
                        return Err(IndexError::Unavailable {
                            attempts: max_attempts,
                            reason: e.to_string(),
                        }
                        .into());
                    }
                    tracing::warn!(index = index, attempt = attempt, error = %e, "Bulk submission failed");
                }
                Err(e) => return Err(e),
            }

            if pending.is_empty() {
                break;
            }

            if attempt < max_attempts {
                let delay = backoff.next_delay();
                crate::log_retry_attempt!(
                    attempt + 1,
                    max_attempts,
                    format!("{} documents pending", pending.len())
                );
                tokio::time::sleep(delay).await;
            }
        }

        for i in pending {
            let reason = match &outcomes[i] {
                LoadOutcome::RetryableFailure(reason) => reason.clone(),
                other => format!("{other:?}"),
            };
            outcomes[i] = LoadOutcome::PermanentFailure(format!(
                "retries exhausted after {max_attempts} attempts: {reason}"
            ));
        }

        Ok(outcomes)
    }

    async fn submit(
        &self,
        index: &str,
        batch: &[DenormalizedDocument],
    ) -> Result<Vec<BulkItemStatus>> {
        match tokio::time::timeout(self.timeout, self.client.bulk_upsert(index, batch)).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Index(IndexError::Timeout(format!(
                "bulk submission exceeded {}s",
                self.timeout.as_secs()
            )))),
        }
    }
}
