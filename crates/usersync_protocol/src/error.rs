//! Error types for decoding remote payloads.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while decoding a remote page.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The response carried no body at all.
    #[error("empty response body")]
    EmptyBody,

    /// The body was not a valid users page.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}
