//! Sync state machine and statistics.

use serde::Serialize;
use std::fmt;
use usersync_protocol::Timestamp;

/// The current state of the sync engine.
///
/// One sync moves through
/// `Idle -> FetchingPage(1) -> ... -> FetchingPage(n) -> Accumulated -> Merging -> Done`,
/// or ends in `Failed` from any fetching or merging state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "page", rename_all = "kebab-case")]
pub enum SyncState {
    /// No sync has run yet.
    Idle,
    /// Waiting for the given page.
    FetchingPage(u32),
    /// Every page arrived; nothing merged yet.
    Accumulated,
    /// Writing unseen records to the store.
    Merging,
    /// The last sync completed.
    Done,
    /// The last sync failed or was cancelled.
    Failed,
}

impl SyncState {
    /// Returns true while a sync is running.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SyncState::FetchingPage(_) | SyncState::Accumulated | SyncState::Merging
        )
    }

    /// Returns true once a sync has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        matches!(self, SyncState::Done | SyncState::Failed)
    }

    /// Returns true if the engine can start a new sync without waiting.
    pub fn can_start_sync(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Idle => f.write_str("idle"),
            SyncState::FetchingPage(page) => write!(f, "fetching page {page}"),
            SyncState::Accumulated => f.write_str("accumulated"),
            SyncState::Merging => f.write_str("merging"),
            SyncState::Done => f.write_str("done"),
            SyncState::Failed => f.write_str("failed"),
        }
    }
}

/// Statistics about sync operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Number of syncs that completed.
    pub syncs_completed: u64,
    /// Number of syncs that failed or were cancelled.
    pub syncs_failed: u64,
    /// Total pages fetched by completed syncs.
    pub pages_fetched: u64,
    /// Total records fetched by completed syncs.
    pub records_fetched: u64,
    /// Total records added by completed syncs.
    pub records_added: u64,
    /// When the last sync completed.
    pub last_sync_time: Option<Timestamp>,
    /// Last error message.
    pub last_error: Option<String>,
}
