//! Error types for remote store operations.

use thiserror::Error;

/// Errors that can occur when talking to the remote store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced row does not exist remotely.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store returned a record this layer cannot interpret.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize or deserialize a payload.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
