//! Local user store trait definition.

use crate::error::StoreResult;
use std::sync::Arc;
use usersync_protocol::{UserId, UserRecord};

/// A keyed record store holding the local user set.
///
/// # Invariants
///
/// - `id` uniquely identifies a record
/// - `insert` on a known id replaces the stored record
/// - `update` and `delete` fail with [`StoreError::NotFound`] for unknown ids
/// - Each call is atomic: readers never observe a half-applied write
/// - Implementations must be `Send + Sync` and callable from any thread
///
/// # Implementors
///
/// - [`super::InMemoryUserStore`] - For testing
/// - [`super::FileUserStore`] - For persistent storage
///
/// [`StoreError::NotFound`]: crate::StoreError::NotFound
pub trait LocalUserStore: Send + Sync {
    /// Returns every record, in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be read.
    fn get_all(&self) -> StoreResult<Vec<UserRecord>>;

    /// Returns the record with the given id, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    /// Inserts a record, replacing any record with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be persisted.
    fn insert(&self, user: &UserRecord) -> StoreResult<()>;

    /// Replaces an existing record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this id, or an I/O error.
    fn update(&self, user: &UserRecord) -> StoreResult<()>;

    /// Removes an existing record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this id, or an I/O error.
    fn delete(&self, user: &UserRecord) -> StoreResult<()>;

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn len(&self) -> StoreResult<usize> {
        Ok(self.get_all()?.len())
    }

    /// Returns true if the store holds no records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns the highest stored id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn max_id(&self) -> StoreResult<Option<UserId>> {
        Ok(self.get_all()?.iter().map(|user| user.id).max())
    }
}

impl<S: LocalUserStore + ?Sized> LocalUserStore for Arc<S> {
    fn get_all(&self) -> StoreResult<Vec<UserRecord>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        (**self).get_by_id(id)
    }

    fn insert(&self, user: &UserRecord) -> StoreResult<()> {
        (**self).insert(user)
    }

    fn update(&self, user: &UserRecord) -> StoreResult<()> {
        (**self).update(user)
    }

    fn delete(&self, user: &UserRecord) -> StoreResult<()> {
        (**self).delete(user)
    }

    fn len(&self) -> StoreResult<usize> {
        (**self).len()
    }

    fn max_id(&self) -> StoreResult<Option<UserId>> {
        (**self).max_id()
    }
}
