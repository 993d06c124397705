//! Domain error types
//!
//! This module defines the error hierarchy for searchsync. Adapter failures are
//! wrapped in [`SourceError`] and [`IndexError`] so that no third-party client
//! types leak into the engine.

use thiserror::Error;

/// Main searchsync error type
///
/// Every fallible engine operation returns this type. The orchestrator routes
/// errors by asking [`SyncError::is_fatal`] and [`SyncError::is_transient`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unrecoverable setup problem scoped to a single entity
    #[error("Fatal configuration error for entity '{entity}': {message}")]
    FatalConfiguration { entity: String, message: String },

    /// Relational source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Search index errors
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Network or timeout problem not attributable to a specific adapter
    #[error("Transient connection error: {0}")]
    TransientConnection(String),

    /// Malformed or incomplete joined data for one row
    #[error("Data shape error for row {row_id}: {reason}")]
    DataShape { row_id: String, reason: String },

    /// Stored cursor failed its integrity check
    #[error("Checkpoint corruption for entity '{entity}': {reason}")]
    CheckpointCorruption { entity: String, reason: String },

    /// Attempt to persist a cursor that precedes the stored one
    #[error("Checkpoint regression for entity '{entity}': {attempted} precedes stored {stored}")]
    CheckpointRegression {
        entity: String,
        attempted: String,
        stored: String,
    },

    /// Durability failure while reading or writing checkpoint state
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Create a data shape error for a row
    pub fn data_shape(row_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataShape {
            row_id: row_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a corruption error for an entity's checkpoint
    pub fn corruption(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CheckpointCorruption {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error halts the entity without retrying
    ///
    /// Checkpoint corruption and configuration problems need an operator; retrying
    /// them would only repeat the failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::CheckpointCorruption { .. }
                | SyncError::FatalConfiguration { .. }
                | SyncError::Configuration(_)
        )
    }

    /// Whether this error is expected to clear up on its own
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::TransientConnection(_) | SyncError::Checkpoint(_) | SyncError::Io(_) => {
                true
            }
            SyncError::Source(e) => e.is_transient(),
            SyncError::Index(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether this error counts toward an entity's consecutive error cap
    ///
    /// Plain transient failures back off indefinitely. An index that stayed
    /// unavailable through every retry attempt still counts.
    pub fn counts_toward_halt(&self) -> bool {
        !self.is_transient() || matches!(self, SyncError::Index(IndexError::Unavailable { .. }))
    }
}

/// Relational source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to obtain a connection
    #[error("Failed to connect to source: {0}")]
    ConnectionFailed(String),

    /// Query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Statement or call exceeded its deadline
    #[error("Source request timed out: {0}")]
    Timeout(String),

    /// A fetched row could not be decoded
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Rows came back out of order, overlapping the cursor, or over the page limit
    #[error("Source contract violated: {0}")]
    ContractViolation(String),
}

impl SourceError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SourceError::ConnectionFailed(_)
                | SourceError::QueryFailed(_)
                | SourceError::Timeout(_)
                | SourceError::ContractViolation(_)
        )
    }
}

/// Search index errors
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failed to reach the index cluster
    #[error("Failed to connect to index: {0}")]
    ConnectionFailed(String),

    /// Request exceeded its deadline
    #[error("Index request timed out: {0}")]
    Timeout(String),

    /// The whole submission was rejected with an HTTP status
    #[error("Index request failed: {status} - {message}")]
    RequestFailed { status: u16, message: String },

    /// Response body did not match the bulk API contract
    #[error("Invalid response from index: {0}")]
    InvalidResponse(String),

    /// Submission kept failing at the transport level until the attempt cap
    #[error("Index unavailable after {attempts} attempts: {reason}")]
    Unavailable { attempts: u32, reason: String },
}

impl IndexError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            IndexError::ConnectionFailed(_)
            | IndexError::Timeout(_)
            | IndexError::Unavailable { .. } => true,
            IndexError::RequestFailed { status, .. } => *status == 429 || *status >= 500,
            IndexError::InvalidResponse(_) => false,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_source_error_conversion() {
        let source_err = SourceError::ConnectionFailed("refused".to_string());
        let err: SyncError = source_err.into();
        assert!(matches!(err, SyncError::Source(_)));
        assert!(err.is_transient());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_index_error_conversion() {
        let index_err = IndexError::Timeout("30s".to_string());
        let err: SyncError = index_err.into();
        assert!(matches!(err, SyncError::Index(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_request_failed_transience_follows_status() {
        let throttled = IndexError::RequestFailed {
            status: 429,
            message: "too many requests".to_string(),
        };
        let unavailable = IndexError::RequestFailed {
            status: 503,
            message: "unavailable".to_string(),
        };
        let unauthorized = IndexError::RequestFailed {
            status: 401,
            message: "unauthorized".to_string(),
        };

        assert!(throttled.is_transient());
        assert!(unavailable.is_transient());
        assert!(!unauthorized.is_transient());
    }

    #[test]
    fn test_index_error_transience_covers_every_variant() {
        let cases = [
            (IndexError::ConnectionFailed("refused".to_string()), true),
            (IndexError::Timeout("30s".to_string()), true),
            (
                IndexError::Unavailable {
                    attempts: 5,
                    reason: "refused".to_string(),
                },
                true,
            ),
            (IndexError::InvalidResponse("items missing".to_string()), false),
        ];

        for (err, transient) in cases {
            // Adding a variant breaks this match until it is routed here too
            match &err {
                IndexError::ConnectionFailed(_)
                | IndexError::Timeout(_)
                | IndexError::RequestFailed { .. }
                | IndexError::InvalidResponse(_)
                | IndexError::Unavailable { .. } => {}
            }
            assert_eq!(err.is_transient(), transient, "{err}");
        }
    }

    #[test]
    fn test_only_persistent_failures_count_toward_halt() {
        let connection: SyncError = SourceError::ConnectionFailed("reset".to_string()).into();
        let checkpoint_io = SyncError::Checkpoint("disk busy".to_string());
        let exhausted: SyncError = IndexError::Unavailable {
            attempts: 5,
            reason: "connection refused".to_string(),
        }
        .into();
        let rejected: SyncError = IndexError::RequestFailed {
            status: 400,
            message: "bad request".to_string(),
        }
        .into();

        assert!(!connection.counts_toward_halt());
        assert!(!checkpoint_io.counts_toward_halt());
        assert!(exhausted.counts_toward_halt());
        assert!(rejected.counts_toward_halt());
    }

    #[test]
    fn test_corruption_is_fatal() {
        let err = SyncError::corruption("movies", "checksum mismatch");
        assert!(err.is_fatal());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("movies"));
    }

    #[test]
    fn test_fatal_configuration_is_fatal() {
        let err = SyncError::FatalConfiguration {
            entity: "orders".to_string(),
            message: "unknown entity kind 'orders'".to_string(),
        };
        assert!(err.is_fatal());
    }

    #[test]
    fn test_data_shape_is_neither_fatal_nor_transient() {
        let err = SyncError::data_shape("row-1", "missing parent");
        assert!(!err.is_fatal());
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "Data shape error for row row-1: missing parent"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SyncError = io_err.into();
        assert!(matches!(err, SyncError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SyncError = json_err.into();
        assert!(matches!(err, SyncError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SyncError = toml_err.into();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
