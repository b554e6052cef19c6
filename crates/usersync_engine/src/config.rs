//! Configuration for the sync engine.

use std::time::Duration;

/// Base URL of the public reqres.in user API.
pub const DEFAULT_BASE_URL: &str = "https://reqres.in/api";

/// Default upper bound on pages fetched in one sync.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Configuration for sync operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL of the remote API (e.g., "https://reqres.in/api").
    pub base_url: String,
    /// Page count to use when the source does not report a total.
    pub fixed_page_count: Option<u32>,
    /// Maximum number of pages fetched before giving up.
    pub max_pages: u32,
    /// Request timeout.
    pub timeout: Duration,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fixed_page_count: None,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: Duration::from_secs(30),
        }
    }

    /// Fetches `pages` pages when the source reports no total.
    pub fn with_fixed_page_count(mut self, pages: u32) -> Self {
        self.fixed_page_count = Some(pages);
        self
    }

    /// Sets the page cap.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the URL of one page of the user listing.
    pub fn page_url(&self, page: u32) -> String {
        format!("{}/users?page={}", self.base_url.trim_end_matches('/'), page)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
