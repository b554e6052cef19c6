//! Error types for store operations.

use std::io;
use thiserror::Error;
use usersync_protocol::UserId;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this identity exists.
    #[error("user {0} not found")]
    NotFound(UserId),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Every user id is taken, so no new local user can be created.
    #[error("user ids exhausted")]
    IdsExhausted,

    /// The persisted data could not be read back.
    #[error("store corrupted: {0}")]
    Corrupted(String),
}

impl StoreError {
    /// Returns the missing identity for `NotFound` errors.
    #[must_use]
    pub fn missing_id(&self) -> Option<UserId> {
        match self {
            StoreError::NotFound(id) => Some(*id),
            _ => None,
        }
    }
}
