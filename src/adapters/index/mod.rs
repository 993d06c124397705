//! Search index abstraction
//!
//! The bulk loader only sees [`IndexClient`]; the Elasticsearch implementation
//! lives in [`crate::adapters::elasticsearch`].

pub mod traits;

pub use traits::{BulkItemStatus, IndexClient};
