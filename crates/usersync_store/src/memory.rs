//! In-memory user store for testing.

use crate::error::{StoreError, StoreResult};
use crate::store::LocalUserStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use usersync_protocol::{UserId, UserRecord};

/// An in-memory user store.
///
/// This store keeps all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral sessions that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads. Every
/// operation takes the lock once, so each write is atomic for readers.
///
/// # Example
///
/// ```rust
/// use usersync_protocol::{Timestamp, UserId, UserRecord};
/// use usersync_store::{InMemoryUserStore, LocalUserStore};
///
/// let store = InMemoryUserStore::new();
/// store
///     .insert(&UserRecord::new(UserId::new(3), "c@d.e", "Cy", "Do", "", Timestamp::UNSET))
///     .unwrap();
/// assert_eq!(store.len().unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<BTreeMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with records.
    ///
    /// Later records replace earlier ones with the same id.
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let users = users.into_iter().map(|user| (user.id, user)).collect();
        Self {
            users: RwLock::new(users),
        }
    }

    /// Removes every record.
    pub fn clear(&self) {
        self.users.write().clear();
    }
}

impl LocalUserStore for InMemoryUserStore {
    fn get_all(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.users.read().values().cloned().collect())
    }

    fn get_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.read().get(&id).cloned())
    }

    fn insert(&self, user: &UserRecord) -> StoreResult<()> {
        self.users.write().insert(user.id, user.clone());
        Ok(())
    }

    fn update(&self, user: &UserRecord) -> StoreResult<()> {
        let mut users = self.users.write();
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(user.id)),
        }
    }

    fn delete(&self, user: &UserRecord) -> StoreResult<()> {
        self.users
            .write()
            .remove(&user.id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(user.id))
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.users.read().len())
    }

    fn max_id(&self) -> StoreResult<Option<UserId>> {
        Ok(self.users.read().keys().next_back().copied())
    }
}
