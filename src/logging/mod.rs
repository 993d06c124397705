//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Human-readable console output
//! - Optional JSON file output with daily, hourly or no rotation
//! - Level from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use searchsync::logging::init_logging;
//! use searchsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(entity = "movies", "Pipeline started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use searchsync::log_error_with_context;
/// use searchsync::domain::SyncError;
///
/// let error = SyncError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}

/// Log a polled batch against the page size
///
/// # Example
///
/// ```no_run
/// use searchsync::log_batch_processing;
///
/// log_batch_processing!(40, 100);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($rows:expr, $page_size:expr) => {
        tracing::debug!(
            rows = $rows,
            page_size = $page_size,
            fill_pct = ($rows as f64 / $page_size as f64 * 100.0),
            "Processing batch"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use searchsync::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "2 documents pending");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
