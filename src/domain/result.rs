//! Result type alias for Catalog Sync

use super::errors::SyncError;

/// Result type alias for Catalog Sync operations
///
/// # Examples
///
/// ```
/// use catalog_sync::domain::result::Result;
/// use catalog_sync::domain::errors::SyncError;
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
