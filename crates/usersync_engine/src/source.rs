//! Remote user source abstraction.

use crate::error::{FetchError, FetchResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use usersync_protocol::{UserRecord, UsersPage};

/// One page of remote users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemotePage {
    /// Users on the page, in server order.
    pub users: Vec<UserRecord>,
    /// Total number of pages, if the server reports it.
    pub total_pages: Option<u32>,
}

impl RemotePage {
    /// Creates a page without a reported total.
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users,
            total_pages: None,
        }
    }

    /// Sets the reported total page count.
    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    /// Returns true if the page holds no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl From<UsersPage> for RemotePage {
    fn from(page: UsersPage) -> Self {
        let total_pages = page.total_pages;
        Self {
            users: page.into_records(),
            total_pages,
        }
    }
}

/// A paginated source of remote user records.
///
/// Pages are numbered from 1. Implementations return the page in stable
/// server order or fail explicitly; they never retry on their own.
pub trait RemoteUserSource: Send + Sync {
    /// Fetches one page.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Unsuccessful`] if the server answered without a
    /// usable page and [`FetchError::Transport`] if no response was decoded.
    fn fetch_page(&self, page: u32) -> FetchResult<RemotePage>;
}

impl<S: RemoteUserSource + ?Sized> RemoteUserSource for Arc<S> {
    fn fetch_page(&self, page: u32) -> FetchResult<RemotePage> {
        (**self).fetch_page(page)
    }
}

/// A scripted user source for testing.
///
/// Pages past the scripted ones come back empty.
#[derive(Debug, Default)]
pub struct MockUserSource {
    pages: Mutex<Vec<Vec<UserRecord>>>,
    total_pages: Mutex<Option<u32>>,
    failures: Mutex<HashMap<u32, FetchError>>,
    requests: Mutex<Vec<u32>>,
    latency: Mutex<Option<Duration>>,
}

impl MockUserSource {
    /// Creates a source with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source serving the given pages, starting at page 1.
    pub fn with_pages(pages: Vec<Vec<UserRecord>>) -> Self {
        let source = Self::new();
        *source.pages.lock() = pages;
        source
    }

    /// Replaces the scripted pages.
    pub fn set_pages(&self, pages: Vec<Vec<UserRecord>>) {
        *self.pages.lock() = pages;
    }

    /// Appends a page after the scripted ones.
    pub fn push_page(&self, users: Vec<UserRecord>) {
        self.pages.lock().push(users);
    }

    /// Reports `total` as the page count on every response.
    pub fn set_total_pages(&self, total: Option<u32>) {
        *self.total_pages.lock() = total;
    }

    /// Makes every request for `page` fail with `error`.
    pub fn fail_page(&self, page: u32, error: FetchError) {
        self.failures.lock().insert(page, error);
    }

    /// Removes all injected failures.
    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// Delays every response.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Returns the pages requested so far, in request order.
    pub fn requests(&self) -> Vec<u32> {
        self.requests.lock().clone()
    }

    /// Forgets recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }
}

impl RemoteUserSource for MockUserSource {
    fn fetch_page(&self, page: u32) -> FetchResult<RemotePage> {
        self.requests.lock().push(page);

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }

        if let Some(error) = self.failures.lock().get(&page) {
            return Err(error.clone());
        }

        let users = page
            .checked_sub(1)
            .and_then(|index| self.pages.lock().get(index as usize).cloned())
            .unwrap_or_default();

        Ok(RemotePage {
            users,
            total_pages: *self.total_pages.lock(),
        })
    }
}
