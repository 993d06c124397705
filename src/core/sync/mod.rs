//! Sync orchestration
//!
//! - [`state`] - the per-entity state machine
//! - [`pipeline`] - the loop that drives one entity through it
//! - [`coordinator`] - runs one pipeline per configured entity
//! - [`summary`] - per-entity reports and the process exit code

pub mod coordinator;
pub mod pipeline;
pub mod state;
pub mod summary;

pub use coordinator::{SyncComponents, SyncCoordinator};
pub use pipeline::EntityPipeline;
pub use state::{transition, StageOutcome, SyncState};
pub use summary::{EntityReport, SyncSummary, EXIT_ENTITY_FATAL, EXIT_OK};
