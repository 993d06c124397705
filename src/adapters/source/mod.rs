//! Relational source abstraction
//!
//! The sync engine only sees [`SourceClient`]; the PostgreSQL implementation
//! lives in [`crate::adapters::postgresql`].

pub mod traits;

pub use traits::SourceClient;
