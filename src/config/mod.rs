//! Configuration management for searchsync.
//!
//! searchsync reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SEARCHSYNC_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use searchsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("searchsync.toml")?;
//!
//! println!("Index: {}", config.index.url);
//! for entity in &config.entities {
//!     println!("{} ({}) -> {}", entity.name, entity.kind, entity.index_name());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! connection_string = "${DATABASE_URL}"
//! schema = "content"
//!
//! [index]
//! url = "http://localhost:9200"
//!
//! [sync]
//! page_size = 100
//!
//! [sync.idle_backoff]
//! min_ms = 1000
//! max_ms = 60000
//!
//! [checkpoint]
//! path = "/var/lib/searchsync"
//!
//! [[entities]]
//! name = "movies"
//! kind = "movies"
//!
//! [[entities]]
//! name = "persons"
//! kind = "persons"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BackoffConfig, CheckpointConfig, EntityConfig, IndexConfig, LoggingConfig,
    RetryConfig, SearchSyncConfig, SourceConfig, SyncConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
