//! External system integrations for searchsync.
//!
//! - [`source`] - Relational source abstraction (trait-based)
//! - [`postgresql`] - PostgreSQL source implementation
//! - [`index`] - Search index abstraction (trait-based)
//! - [`elasticsearch`] - Elasticsearch bulk API implementation
//! - [`factory`] - Client construction from configuration
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. The sync engine depends only
//! on [`source::SourceClient`] and [`index::IndexClient`].
//!
//! ```rust,no_run
//! use searchsync::adapters::factory::{create_index_client, create_source_client};
//! use searchsync::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("searchsync.toml")?;
//! let source = create_source_client(&config)?;
//! let index = create_index_client(&config)?;
//!
//! source.test_connection().await?;
//! index.ping().await?;
//! # Ok(())
//! # }
//! ```

pub mod elasticsearch;
pub mod factory;
pub mod index;
pub mod postgresql;
pub mod source;
