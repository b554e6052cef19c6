//! # usersync Engine
//!
//! Remote sync, merge and query view for usersync.
//!
//! This crate provides:
//! - A paginated remote source abstraction with mock and HTTP implementations
//! - The sync engine (fetch every page, then insert unseen identities)
//! - A sync state machine and statistics
//! - Filter/sort/paginate projections over the local set
//! - A background worker for running engine calls off the caller's thread
//!
//! ## Architecture
//!
//! A sync runs in two strictly ordered phases:
//! 1. Accumulate: fetch pages 1, 2, ... until the source signals the end
//! 2. Merge: insert each fetched record whose id the store does not hold
//!
//! Nothing is written unless every page arrived.
//!
//! ## Key Invariants
//!
//! - Merge is insert-if-absent: an existing local record is never overwritten
//! - `created_at` is set once, from one clock reading per merge
//! - Accumulated records keep page order, then in-page order
//! - Syncs on one engine never overlap
//!
//! ## Example
//!
//! ```rust
//! use usersync_engine::{MockUserSource, SortKey, SyncConfig, SyncEngine, ViewQuery};
//! use usersync_protocol::{Timestamp, UserId, UserRecord};
//! use usersync_store::InMemoryUserStore;
//!
//! let user = |id: u64, first: &str| {
//!     UserRecord::new(UserId::new(id), "", first, "Lee", "", Timestamp::UNSET)
//! };
//! let source = MockUserSource::with_pages(vec![vec![user(1, "Ann"), user(2, "Bob")]]);
//! let engine = SyncEngine::new(SyncConfig::default(), source, InMemoryUserStore::new());
//!
//! assert_eq!(engine.sync_from_remote().unwrap().len(), 2);
//! assert!(engine.sync_from_remote().unwrap().is_empty());
//!
//! let view = engine
//!     .query(&ViewQuery::new().with_search("bo").with_sort(SortKey::Name))
//!     .unwrap();
//! assert_eq!(view.items[0].first_name, "Bob");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod engine;
mod error;
mod http;
mod query;
mod source;
mod state;
mod worker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SyncConfig, DEFAULT_BASE_URL, DEFAULT_MAX_PAGES};
pub use engine::SyncEngine;
pub use error::{FetchError, FetchResult, SyncError, SyncResult, WorkerError};
pub use http::{HttpClient, HttpResponse, HttpUserSource};
pub use query::{
    ParseSortKeyError, Projection, QueryView, SortKey, ViewQuery, DEFAULT_PAGE_SIZE,
};
pub use source::{MockUserSource, RemotePage, RemoteUserSource};
pub use state::{SyncState, SyncStats};
pub use worker::{JobHandle, SyncWorker, WORKER_THREAD_NAME};
