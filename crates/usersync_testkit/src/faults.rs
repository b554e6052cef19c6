//! Fault injection for store-dependent code.

use parking_lot::Mutex;
use std::io;
use usersync_protocol::{UserId, UserRecord};
use usersync_store::{InMemoryUserStore, LocalUserStore, StoreError, StoreResult};

/// An in-memory store whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: InMemoryUserStore,
    fail_insert_at: Mutex<Option<usize>>,
    inserts: Mutex<usize>,
}

impl FlakyStore {
    /// Creates a store that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with records.
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            inner: InMemoryUserStore::with_users(users),
            ..Self::default()
        }
    }

    /// Makes the `n`th insert from now on (1-based) and every later one fail.
    pub fn fail_insert_after(&self, n: usize) {
        *self.inserts.lock() = 0;
        *self.fail_insert_at.lock() = Some(n);
    }

    /// Lets every write succeed again.
    pub fn heal(&self) {
        *self.fail_insert_at.lock() = None;
    }

    /// Number of inserts attempted since the last arming.
    pub fn insert_attempts(&self) -> usize {
        *self.inserts.lock()
    }

    fn injected(id: UserId) -> StoreError {
        StoreError::Io(io::Error::other(format!(
            "injected failure writing user {id}"
        )))
    }
}

impl LocalUserStore for FlakyStore {
    fn get_all(&self) -> StoreResult<Vec<UserRecord>> {
        self.inner.get_all()
    }

    fn get_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        self.inner.get_by_id(id)
    }

    fn insert(&self, user: &UserRecord) -> StoreResult<()> {
        let attempt = {
            let mut inserts = self.inserts.lock();
            *inserts += 1;
            *inserts
        };
        if matches!(*self.fail_insert_at.lock(), Some(n) if attempt >= n) {
            return Err(Self::injected(user.id));
        }
        self.inner.insert(user)
    }

    fn update(&self, user: &UserRecord) -> StoreResult<()> {
        self.inner.update(user)
    }

    fn delete(&self, user: &UserRecord) -> StoreResult<()> {
        self.inner.delete(user)
    }

    fn len(&self) -> StoreResult<usize> {
        self.inner.len()
    }

    fn max_id(&self) -> StoreResult<Option<UserId>> {
        self.inner.max_id()
    }
}
