//! Entity pipeline
//!
//! One pipeline drives one configured entity through
//! poll → related lookup → transform → load → checkpoint, forever, until
//! shutdown or a fatal error. Stages run strictly in sequence; the next state
//! is always decided by [`transition`].
//!
//! The cursor moves only after every row of a batch reached a terminal
//! outcome. Rows that were skipped or rejected permanently are written to the
//! dead-letter ledger first, then the cursor is persisted past them.

use super::coordinator::SyncComponents;
use super::state::{transition, StageOutcome, SyncState};
use super::summary::EntityReport;
use crate::config::{EntityConfig, SearchSyncConfig};
use crate::core::backoff::ExponentialBackoff;
use crate::core::checkpoint::{CheckpointManager, DeadLetter, DeadLetterSink, SyncCursor};
use crate::core::extract::{ChangeBatch, ChangeExtractor, PollResult};
use crate::core::load::BulkLoader;
use crate::core::transform::{transformer_for, Transformer};
use crate::domain::document::{DenormalizedDocument, LoadOutcome, TransformOutcome};
use crate::domain::entity::EntityKind;
use crate::domain::ids::{EntityName, RowId};
use crate::domain::row::{requested_relations, RelatedRows};
use crate::domain::{Result, SyncError};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Work carried between the stages of one cycle
#[derive(Default)]
struct Cycle {
    batch: Option<ChangeBatch>,
    related: RelatedRows,
    documents: Vec<DenormalizedDocument>,
    dead_letters: Vec<DeadLetter>,
    loaded: u64,
    skipped: u64,
    failed: u64,
}

/// Sync loop for a single entity
pub struct EntityPipeline {
    entity: EntityName,
    kind: EntityKind,
    index: String,
    page_size: usize,
    extractor: ChangeExtractor,
    related_timeout: Duration,
    transformer: Arc<dyn Transformer>,
    loader: BulkLoader,
    checkpoints: Arc<CheckpointManager>,
    dead_letters: Option<Arc<dyn DeadLetterSink>>,
    idle_backoff: ExponentialBackoff,
    error_backoff: ExponentialBackoff,
    max_consecutive_errors: u32,
    shutdown: watch::Receiver<bool>,
}

impl EntityPipeline {
    /// Assemble the pipeline for one configured entity
    ///
    /// # Errors
    ///
    /// Returns `FatalConfiguration` if the entity name or kind is not usable;
    /// that entity must not be started.
    pub fn build(
        entity: &EntityConfig,
        config: &SearchSyncConfig,
        components: &SyncComponents,
        checkpoints: Arc<CheckpointManager>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let fatal = |message: String| SyncError::FatalConfiguration {
            entity: entity.name.clone(),
            message,
        };
        let name = EntityName::new(entity.name.as_str()).map_err(fatal)?;
        let kind = EntityKind::from_str(&entity.kind).map_err(fatal)?;
        let sync = &config.sync;

        Ok(Self {
            entity: name,
            kind,
            index: entity.index_name().to_string(),
            page_size: entity.effective_page_size(sync),
            extractor: ChangeExtractor::new(components.source.clone(), sync.poll_timeout()),
            related_timeout: sync.poll_timeout(),
            transformer: transformer_for(kind),
            loader: BulkLoader::new(components.index.clone(), sync.retry.clone(), sync.load_timeout())
                .with_dry_run(config.application.dry_run),
            checkpoints,
            dead_letters: components.dead_letters.clone(),
            idle_backoff: sync.idle_backoff.backoff(),
            error_backoff: sync.idle_backoff.backoff(),
            max_consecutive_errors: sync.max_consecutive_errors,
            shutdown,
        })
    }

    pub fn entity(&self) -> &EntityName {
        &self.entity
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Run until shutdown or a fatal error
    pub async fn run(mut self) -> EntityReport {
        let mut report = EntityReport::new(&self.entity);
        let mut state = SyncState::Idle;
        let mut cursor: Option<SyncCursor> = None;
        let mut cycle = Cycle::default();
        let mut consecutive_errors: u32 = 0;
        let mut sleep_for = Duration::ZERO;

        tracing::info!(
            entity = %self.entity,
            kind = %self.kind,
            index = %self.index,
            page_size = self.page_size,
            "Starting entity pipeline"
        );

        while !state.is_terminal() {
            let outcome = match state {
                SyncState::Idle => {
                    cycle = Cycle::default();
                    if self.shutdown_requested() {
                        StageOutcome::Shutdown
                    } else {
                        StageOutcome::Proceed
                    }
                }
                SyncState::Polling => match self.poll(&mut cursor).await {
                    Ok(PollResult::Batch(batch)) => {
                        crate::log_batch_processing!(batch.len(), self.page_size);
                        cycle.batch = Some(batch);
                        StageOutcome::BatchReady
                    }
                    Ok(PollResult::Empty) => StageOutcome::Empty,
                    Err(e) => self.on_error(e, &mut consecutive_errors, &mut report),
                },
                SyncState::Empty => {
                    sleep_for = self.idle_backoff.next_delay();
                    tracing::debug!(
                        entity = %self.entity,
                        sleep_ms = sleep_for.as_millis() as u64,
                        "Caught up"
                    );
                    StageOutcome::Proceed
                }
                SyncState::Batch => {
                    self.idle_backoff.reset();
                    if self.shutdown_requested() {
                        StageOutcome::Shutdown
                    } else {
                        match self.fetch_related(&cycle).await {
                            Ok(related) => {
                                cycle.related = related;
                                StageOutcome::Proceed
                            }
                            Err(e) => self.on_error(e, &mut consecutive_errors, &mut report),
                        }
                    }
                }
                SyncState::Transforming => {
                    self.transform(&mut cycle);
                    if self.shutdown_requested() {
                        StageOutcome::Shutdown
                    } else {
                        StageOutcome::Proceed
                    }
                }
                SyncState::Loading => match self.load(&mut cycle).await {
                    Ok(()) => StageOutcome::Proceed,
                    Err(e) => self.on_error(e, &mut consecutive_errors, &mut report),
                },
                SyncState::Checkpointing => match self.checkpoint(&cycle).await {
                    Ok(advanced) => {
                        report.cycles += 1;
                        report.documents_loaded += cycle.loaded;
                        report.rows_skipped += cycle.skipped;
                        report.documents_failed += cycle.failed;
                        report.last_cursor = Some(advanced.clone());
                        cursor = Some(advanced);
                        consecutive_errors = 0;
                        self.error_backoff.reset();
                        StageOutcome::Proceed
                    }
                    Err(e) => self.on_error(e, &mut consecutive_errors, &mut report),
                },
                SyncState::Error => {
                    cycle = Cycle::default();
                    sleep_for = self.error_backoff.next_delay();
                    StageOutcome::Proceed
                }
                SyncState::BackoffSleep => {
                    if self.sleep_or_shutdown(sleep_for).await {
                        StageOutcome::Shutdown
                    } else {
                        StageOutcome::Proceed
                    }
                }
                SyncState::Fatal | SyncState::Stopped => break,
            };

            let next = transition(state, outcome);
            tracing::trace!(entity = %self.entity, from = %state, to = %next, "State transition");
            state = next;
        }

        report.final_state = state;
        if report.last_cursor.is_none() {
            report.last_cursor = cursor;
        }

        tracing::info!(
            entity = %self.entity,
            state = %state,
            cycles = report.cycles,
            "Entity pipeline finished"
        );
        report
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleep for `delay`, waking early on shutdown
    ///
    /// Returns whether shutdown was requested.
    async fn sleep_or_shutdown(&mut self, delay: Duration) -> bool {
        if self.shutdown_requested() {
            return true;
        }

        let signalled = tokio::select! {
            _ = tokio::time::sleep(delay) => None,
            changed = self.shutdown.changed() => Some(changed.is_ok()),
        };

        // Sender dropped: nobody can request shutdown any more, finish the sleep
        if signalled == Some(false) {
            tokio::time::sleep(delay).await;
        }

        self.shutdown_requested()
    }

    /// Route a stage failure
    ///
    /// Transient failures back off without limit. Persistent ones count against
    /// the consecutive error cap.
    fn on_error(
        &self,
        error: SyncError,
        consecutive_errors: &mut u32,
        report: &mut EntityReport,
    ) -> StageOutcome {
        if error.is_fatal() {
            crate::log_error_with_context!(&error, format!("entity '{}' halted", self.entity));
            report.fatal_reason = Some(error.to_string());
            return StageOutcome::Failed { escalate: true };
        }

        if error.counts_toward_halt() {
            *consecutive_errors += 1;
        }
        if *consecutive_errors > self.max_consecutive_errors {
            let reason = format!(
                "{} consecutive errors, last: {}",
                consecutive_errors, error
            );
            tracing::error!(entity = %self.entity, reason = %reason, "Entity halted");
            report.fatal_reason = Some(reason);
            return StageOutcome::Failed { escalate: true };
        }

        tracing::warn!(
            entity = %self.entity,
            error = %error,
            transient = error.is_transient(),
            consecutive_errors = *consecutive_errors,
            max_consecutive_errors = self.max_consecutive_errors,
            "Sync stage failed"
        );
        StageOutcome::Failed { escalate: false }
    }

    async fn poll(&self, cursor: &mut Option<SyncCursor>) -> Result<PollResult> {
        let current = match cursor {
            Some(current) => current.clone(),
            None => {
                let loaded = self.checkpoints.load(&self.entity).await?;
                tracing::info!(entity = %self.entity, cursor = %loaded, "Resuming from cursor");
                *cursor = Some(loaded.clone());
                loaded
            }
        };

        self.extractor.poll(self.kind, &current, self.page_size).await
    }

    async fn fetch_related(&self, cycle: &Cycle) -> Result<RelatedRows> {
        let mut related = RelatedRows::new();
        let Some(batch) = &cycle.batch else {
            return Ok(related);
        };

        for (relation, ids) in requested_relations(batch.rows()) {
            let ids: Vec<RowId> = ids.into_iter().collect();
            let rows = tokio::time::timeout(
                self.related_timeout,
                self.extractor.source().fetch_related(relation, &ids),
            )
            .await
            .map_err(|_| {
                SyncError::TransientConnection(format!(
                    "{} lookup for '{}' timed out after {}s",
                    relation,
                    self.entity,
                    self.related_timeout.as_secs()
                ))
            })??;

            tracing::debug!(
                entity = %self.entity,
                relation = %relation,
                requested = ids.len(),
                found = rows.len(),
                "Resolved related rows"
            );
            related.extend(rows);
        }

        Ok(related)
    }

    fn transform(&self, cycle: &mut Cycle) {
        let Some(batch) = &cycle.batch else {
            return;
        };

        for outcome in self.transformer.build(batch, &cycle.related) {
            match outcome {
                TransformOutcome::Document(doc) => cycle.documents.push(doc),
                TransformOutcome::Skipped(row) => {
                    cycle.skipped += 1;
                    cycle.dead_letters.push(DeadLetter::skipped(&self.entity, &row));
                }
            }
        }
    }

    async fn load(&self, cycle: &mut Cycle) -> Result<()> {
        let outcomes = self.loader.load(&self.index, &cycle.documents).await?;

        for (doc, outcome) in cycle.documents.iter().zip(outcomes) {
            match outcome {
                LoadOutcome::Success => cycle.loaded += 1,
                LoadOutcome::PermanentFailure(reason) | LoadOutcome::RetryableFailure(reason) => {
                    tracing::warn!(
                        entity = %self.entity,
                        row_id = %doc.id,
                        reason = %reason,
                        "Document rejected by index"
                    );
                    let modified_at = cycle
                        .batch
                        .as_ref()
                        .and_then(|b| b.row(&doc.id))
                        .map(|row| row.modified_at)
                        .unwrap_or_default();
                    cycle.failed += 1;
                    cycle.dead_letters.push(DeadLetter::load_failed(
                        &self.entity,
                        doc.id.clone(),
                        modified_at,
                        reason,
                    ));
                }
            }
        }

        Ok(())
    }

    async fn checkpoint(&self, cycle: &Cycle) -> Result<SyncCursor> {
        let batch = cycle.batch.as_ref().ok_or_else(|| {
            SyncError::Other(format!("no batch to checkpoint for '{}'", self.entity))
        })?;

        if !cycle.dead_letters.is_empty() {
            match &self.dead_letters {
                Some(sink) if !self.checkpoints.is_dry_run() => {
                    sink.record(&self.entity, &cycle.dead_letters).await?;
                }
                _ => {
                    for letter in &cycle.dead_letters {
                        tracing::warn!(
                            entity = %self.entity,
                            row_id = %letter.row_id,
                            kind = ?letter.kind,
                            reason = %letter.reason,
                            "Advancing past row"
                        );
                    }
                }
            }
        }

        let advanced = batch.advanced_cursor();
        self.checkpoints
            .checkpoint_batch(&advanced, batch.len())
            .await?;
        Ok(advanced)
    }
}
