//! Core business logic for searchsync.
//!
//! # Modules
//!
//! - [`checkpoint`] - Durable per-entity cursors and the dead-letter ledger
//! - [`extract`] - Polling the source for changed rows
//! - [`transform`] - Building index documents from rows and their relations
//! - [`load`] - Bulk loading with per-document retry
//! - [`sync`] - Per-entity state machine, pipelines and coordination
//! - [`backoff`] - Exponential backoff schedule shared by the above
//!
//! # Sync Cycle
//!
//! Each entity repeats:
//!
//! 1. **Load cursor**: Read the entity's checkpoint (epoch zero if none)
//! 2. **Poll**: Fetch rows changed strictly after the cursor, oldest first
//! 3. **Resolve**: Look up the rows the batch references
//! 4. **Transform**: Build one document per row, skipping malformed rows
//! 5. **Load**: Upsert documents, retrying only the failed subset
//! 6. **Checkpoint**: Record dead letters, then persist the advanced cursor
//!
//! # Example
//!
//! ```rust,no_run
//! use searchsync::config::load_config;
//! use searchsync::core::sync::SyncCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("searchsync.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! if let Some(coordinator) = SyncCoordinator::connect(config, shutdown_rx).await? {
//!     let summary = coordinator.run().await?;
//!     println!("Loaded: {}", summary.documents_loaded());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod checkpoint;
pub mod extract;
pub mod load;
pub mod sync;
pub mod transform;
