//! Error types for the sync engine.

use thiserror::Error;
use usersync_protocol::UserId;
use usersync_store::StoreError;

/// Result type for remote fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors reported by a [`RemoteUserSource`](crate::RemoteUserSource).
///
/// Every variant names the page that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered, but not with a usable page (non-2xx or empty body).
    #[error("request for page {page} was unsuccessful (HTTP {status})")]
    Unsuccessful {
        /// Page that was requested.
        page: u32,
        /// HTTP status code of the response.
        status: u16,
    },

    /// The request never produced a decodable response.
    #[error("transport error on page {page}: {message}")]
    Transport {
        /// Page that was requested.
        page: u32,
        /// Error message.
        message: String,
    },

    /// The source never signalled the last page within the configured bound.
    #[error("page {page} exceeds the limit of {limit} pages")]
    PageLimitExceeded {
        /// Page that would have been requested next.
        page: u32,
        /// Configured maximum number of pages.
        limit: u32,
    },
}

impl FetchError {
    /// Creates a transport error for a page.
    pub fn transport(page: u32, message: impl Into<String>) -> Self {
        Self::Transport {
            page,
            message: message.into(),
        }
    }

    /// Returns the page that failed.
    #[must_use]
    pub fn page(&self) -> u32 {
        match self {
            FetchError::Unsuccessful { page, .. }
            | FetchError::Transport { page, .. }
            | FetchError::PageLimitExceeded { page, .. } => *page,
        }
    }

    /// Returns true if repeating the request could succeed.
    ///
    /// The engine never retries on its own; this is a hint for callers
    /// that layer a retry policy on top.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Unsuccessful { status, .. } => *status == 429 || *status >= 500,
            FetchError::PageLimitExceeded { .. } => false,
        }
    }
}

/// Errors that can occur during sync and local store operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A page fetch failed; nothing was merged.
    #[error("fetching page {page} failed: {source}")]
    Fetch {
        /// Page that failed.
        page: u32,
        /// Underlying fetch error.
        source: FetchError,
    },

    /// A store operation failed. Records written before the failure stay.
    #[error("store operation failed: {source}")]
    Store {
        /// Record being written when the failure happened, if any.
        id: Option<UserId>,
        /// Underlying store error.
        source: StoreError,
    },

    /// Another sync is already running against this store.
    #[error("a sync is already in progress")]
    Busy,

    /// Sync was cancelled.
    #[error("sync cancelled")]
    Cancelled,
}

impl SyncError {
    /// Creates a store error tied to a record.
    pub fn store(id: Option<UserId>, source: StoreError) -> Self {
        Self::Store { id, source }
    }

    /// Returns the failing page for fetch errors.
    #[must_use]
    pub fn page(&self) -> Option<u32> {
        match self {
            SyncError::Fetch { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Returns the record involved in a store error.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            SyncError::Store { id, .. } => *id,
            _ => None,
        }
    }

    /// Returns true if this error can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Fetch { source, .. } => source.is_retryable(),
            SyncError::Busy => true,
            SyncError::Store { .. } | SyncError::Cancelled => false,
        }
    }
}

impl From<FetchError> for SyncError {
    fn from(source: FetchError) -> Self {
        Self::Fetch {
            page: source.page(),
            source,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(source: StoreError) -> Self {
        Self::Store {
            id: source.missing_id(),
            source,
        }
    }
}

/// Errors from the background worker.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The worker stopped before the job produced a result.
    #[error("worker stopped before the job completed")]
    Stopped,
}
