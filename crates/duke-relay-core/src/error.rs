//! Error types for duke-relay-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors returned by [`FileStore`](crate::FileStore) and
/// [`TableStore`](crate::TableStore) implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A local file required by the operation does not exist
    #[error("Local file not found: {}", .0.display())]
    LocalFileMissing(PathBuf),

    /// The remote service rejected the request
    #[error("Remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// No access token could be obtained
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The response could not be interpreted
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid A1 range
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a remote error from a status code and message
    pub fn remote<S: Into<String>>(status: u16, message: S) -> Self {
        StoreError::Remote {
            status,
            message: message.into(),
        }
    }

    /// Whether this error means the addressed object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
