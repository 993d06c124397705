//! Loading documents into the search index

pub mod bulk;

pub use bulk::{classify, BulkLoader, ItemClass};
