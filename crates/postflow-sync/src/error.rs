//! Error types for sync operations.

use postflow_store::StoreError;
use thiserror::Error;

/// Errors that can occur during sync operations.
///
/// Every variant carries a human-readable message; the presentation
/// layer surfaces it as a notification, never retries automatically.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Malformed input, caught before any remote call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced entity absent remotely at mutation time.
    #[error("not found: {0}")]
    NotFound(String),

    /// A remote write failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The read path failed; the previous snapshot is retained.
    #[error("data unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => {
                SyncError::NotFound(format!("{} not found: {}", kind, id))
            }
            other => SyncError::Persistence(other.to_string()),
        }
    }
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
