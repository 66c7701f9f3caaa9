//! Error types for session operations.

use postflow_store::StoreError;
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The identity provider failed.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// A store call made on behalf of the session failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
