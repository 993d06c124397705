//! Domain models and types for searchsync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`EntityName`], [`RowId`])
//! - **Entity kinds and relations** ([`EntityKind`], [`Relation`])
//! - **Rows and documents** ([`SourceRow`], [`DenormalizedDocument`], [`LoadOutcome`])
//! - **Error types** ([`SyncError`], [`SourceError`], [`IndexError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SyncError>`]:
//!
//! ```rust
//! use searchsync::domain::{EntityName, Result, SyncError};
//!
//! fn parse(name: &str) -> Result<EntityName> {
//!     EntityName::new(name).map_err(SyncError::Configuration)
//! }
//!
//! assert!(parse("movies").is_ok());
//! assert!(parse("").is_err());
//! ```

pub mod document;
pub mod entity;
pub mod errors;
pub mod ids;
pub mod result;
pub mod row;

// Re-export commonly used types for convenience
pub use document::{DenormalizedDocument, LoadOutcome, SkippedRow, TransformOutcome};
pub use entity::{EntityKind, Relation};
pub use errors::{IndexError, SourceError, SyncError};
pub use ids::{EntityName, RowId};
pub use result::Result;
pub use row::{RelatedRow, RelatedRows, RowRef, SourceRow};
