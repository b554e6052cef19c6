//! # usersync Testkit
//!
//! Test utilities for usersync.
//!
//! This crate provides:
//! - User record fixtures and sample data sets
//! - Temporary file-backed stores with automatic cleanup
//! - Property-based test generators using proptest
//! - A fault-injecting store for merge failure tests
//!
//! ## Usage
//!
//! ```rust
//! use usersync_testkit::prelude::*;
//! use usersync_store::LocalUserStore;
//!
//! let store = TestStore::file();
//! for user in reqres_users() {
//!     store.insert(&user).unwrap();
//! }
//! assert_eq!(store.len().unwrap(), 12);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
