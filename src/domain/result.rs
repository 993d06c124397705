//! Result type alias for searchsync

use super::errors::SyncError;

/// Result type alias for searchsync operations
///
/// # Examples
///
/// ```
/// use searchsync::domain::result::Result;
/// use searchsync::domain::errors::SyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;
