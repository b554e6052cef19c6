//! # usersync Store
//!
//! Local user store trait and implementations for usersync.
//!
//! The store is a keyed record store: one collection of [`UserRecord`]s
//! keyed by [`UserId`], with CRUD and full-scan operations. It knows
//! nothing about remote sources or merging.
//!
//! ## Design Principles
//!
//! - Every operation is synchronous and must be `Send + Sync`
//! - Each individual write is atomic with respect to readers
//! - Multi-record sequences (such as a merge) are *not* transactional
//!
//! ## Available Stores
//!
//! - [`InMemoryUserStore`] - For testing and ephemeral use
//! - [`FileUserStore`] - JSON document on disk, rewritten atomically
//!
//! ## Example
//!
//! ```rust
//! use usersync_protocol::{Timestamp, UserId, UserRecord};
//! use usersync_store::{InMemoryUserStore, LocalUserStore};
//!
//! let store = InMemoryUserStore::new();
//! let user = UserRecord::new(UserId::new(1), "a@b.c", "Ann", "Lee", "", Timestamp::now());
//! store.insert(&user).unwrap();
//! assert_eq!(store.get_by_id(UserId::new(1)).unwrap(), Some(user));
//! ```
//!
//! [`UserRecord`]: usersync_protocol::UserRecord
//! [`UserId`]: usersync_protocol::UserId

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use file::{FileUserStore, FILE_FORMAT_VERSION};
pub use memory::InMemoryUserStore;
pub use store::LocalUserStore;
