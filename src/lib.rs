// searchsync - Incremental PostgreSQL to Elasticsearch sync
// Copyright (c) 2025 Searchsync Contributors
// Licensed under the MIT License

//! # searchsync - Incremental PostgreSQL to Elasticsearch sync
//!
//! searchsync keeps Elasticsearch indexes in step with a PostgreSQL movie
//! catalogue. It reads only rows changed since the last run, joins them into
//! denormalized documents, upserts them in bulk and checkpoints its progress,
//! so a restart resumes exactly where it stopped.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Extracting** changed rows with a compound `(modified_at, id)` keyset cursor
//! - **Transforming** film works, genres and persons into index documents
//! - **Loading** documents through the `_bulk` API with per-document retry
//! - **Checkpointing** cursors atomically, with checksums and a dead-letter ledger
//!
//! ## Architecture
//!
//! searchsync follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (checkpoint, extract, transform, load, sync)
//! - [`adapters`] - External integrations (PostgreSQL, Elasticsearch)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use searchsync::config::load_config;
//! use searchsync::core::sync::SyncCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("searchsync.toml")?;
//!
//!     let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     tokio::spawn(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         let _ = shutdown_tx.send(true);
//!     });
//!
//!     // None: shutdown arrived while waiting for PostgreSQL and Elasticsearch
//!     let Some(coordinator) = SyncCoordinator::connect(config, shutdown_rx).await? else {
//!         return Ok(());
//!     };
//!     let summary = coordinator.run().await?;
//!     std::process::exit(summary.exit_code());
//! }
//! ```
//!
//! ## Delivery Guarantees
//!
//! Delivery is at-least-once. A cursor is persisted only after every row of
//! its batch reached a terminal outcome, and documents carry the source
//! modification time as an external version, so replays after a crash never
//! overwrite newer documents.
//!
//! ## Error Handling
//!
//! All engine operations return [`domain::Result`], whose error is
//! [`domain::SyncError`]:
//!
//! ```rust
//! use searchsync::domain::SyncError;
//!
//! let error = SyncError::corruption("movies", "checksum mismatch");
//! assert!(error.is_fatal());
//! assert!(!error.is_transient());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
