//! Error types for credential handling

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving credentials or obtaining access tokens
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(
        "No credentials: pass a key path or key document, or set GOOGLE_APPLICATION_CREDENTIALS"
    )]
    MissingCredentials,

    #[error("Failed to read credentials from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service account key: {0}")]
    InvalidKey(#[from] serde_json::Error),

    #[error("Invalid private key: {0}")]
    PrivateKey(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
}
