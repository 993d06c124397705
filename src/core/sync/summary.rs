//! Sync reporting
//!
//! Every pipeline ends with an [`EntityReport`]; the coordinator gathers them
//! into a [`SyncSummary`] that decides the process exit code.

use super::state::SyncState;
use crate::core::checkpoint::SyncCursor;
use crate::domain::ids::EntityName;
use std::time::Duration;

/// Exit code when every pipeline drained cleanly
pub const EXIT_OK: i32 = 0;

/// Exit code when at least one entity halted
pub const EXIT_ENTITY_FATAL: i32 = 3;

/// Final report of one entity pipeline
#[derive(Debug, Clone)]
pub struct EntityReport {
    /// Entity name as configured
    pub entity: String,

    /// `Stopped` or `Fatal`
    pub final_state: SyncState,

    /// Completed extract-to-checkpoint cycles
    pub cycles: u64,

    /// Documents the index accepted
    pub documents_loaded: u64,

    /// Rows the transformer could not build
    pub rows_skipped: u64,

    /// Documents the index rejected permanently
    pub documents_failed: u64,

    /// Last cursor the pipeline advanced to
    pub last_cursor: Option<SyncCursor>,

    /// Why the entity halted
    pub fatal_reason: Option<String>,
}

impl EntityReport {
    pub fn new(entity: &EntityName) -> Self {
        Self {
            entity: entity.to_string(),
            final_state: SyncState::Idle,
            cycles: 0,
            documents_loaded: 0,
            rows_skipped: 0,
            documents_failed: 0,
            last_cursor: None,
            fatal_reason: None,
        }
    }

    /// Report for an entity that halted before its pipeline started
    pub fn fatal(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            final_state: SyncState::Fatal,
            cycles: 0,
            documents_loaded: 0,
            rows_skipped: 0,
            documents_failed: 0,
            last_cursor: None,
            fatal_reason: Some(reason.into()),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.final_state == SyncState::Fatal
    }
}

/// Aggregate result of a `run`
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub reports: Vec<EntityReport>,
    pub duration: Duration,
}

impl SyncSummary {
    pub fn new(reports: Vec<EntityReport>) -> Self {
        Self {
            reports,
            duration: Duration::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn report(&self, entity: &str) -> Option<&EntityReport> {
        self.reports.iter().find(|r| r.entity == entity)
    }

    pub fn has_fatal(&self) -> bool {
        self.reports.iter().any(EntityReport::is_fatal)
    }

    pub fn documents_loaded(&self) -> u64 {
        self.reports.iter().map(|r| r.documents_loaded).sum()
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_fatal() {
            EXIT_ENTITY_FATAL
        } else {
            EXIT_OK
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            entities = self.reports.len(),
            documents_loaded = self.documents_loaded(),
            duration_secs = self.duration.as_secs(),
            "Sync stopped"
        );

        for report in &self.reports {
            let cursor = report
                .last_cursor
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string());

            if report.is_fatal() {
                tracing::error!(
                    entity = %report.entity,
                    reason = report.fatal_reason.as_deref().unwrap_or("unknown"),
                    cursor = %cursor,
                    "Entity halted"
                );
            } else {
                tracing::info!(
                    entity = %report.entity,
                    state = %report.final_state,
                    cycles = report.cycles,
                    loaded = report.documents_loaded,
                    skipped = report.rows_skipped,
                    failed = report.documents_failed,
                    cursor = %cursor,
                    "Entity drained"
                );
            }
        }
    }
}
