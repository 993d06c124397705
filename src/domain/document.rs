//! Index documents and per-row outcomes

use super::ids::RowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document ready for the search index
///
/// `version` is the source modification time in microseconds, which lets the
/// index discard replays of older data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenormalizedDocument {
    pub id: RowId,
    pub version: i64,
    pub body: Value,
}

/// Result of loading one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Success,
    RetryableFailure(String),
    PermanentFailure(String),
}

impl LoadOutcome {
    /// Whether no further attempt will be made for this document
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadOutcome::RetryableFailure(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoadOutcome::Success)
    }
}

/// A row the transformer could not turn into a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub id: RowId,
    pub modified_at: DateTime<Utc>,
    pub reason: String,
}

/// Transformer output for one source row
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutcome {
    Document(DenormalizedDocument),
    Skipped(SkippedRow),
}

impl TransformOutcome {
    pub fn row_id(&self) -> &RowId {
        match self {
            TransformOutcome::Document(doc) => &doc.id,
            TransformOutcome::Skipped(skipped) => &skipped.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_outcome_terminality() {
        assert!(LoadOutcome::Success.is_terminal());
        assert!(LoadOutcome::PermanentFailure("mapping".into()).is_terminal());
        assert!(!LoadOutcome::RetryableFailure("429".into()).is_terminal());
    }
}
