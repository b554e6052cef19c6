//! The sync engine.

use crate::clock::{Clock, SystemClock};
use crate::config::SyncConfig;
use crate::error::{FetchError, FetchResult, SyncError, SyncResult};
use crate::query::{Projection, QueryView, ViewQuery};
use crate::source::RemoteUserSource;
use crate::state::{SyncState, SyncStats};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use usersync_protocol::{NewUser, UserId, UserPatch, UserRecord};
use usersync_store::{LocalUserStore, StoreError};

/// Records gathered from every page of one pass over the remote listing.
struct Accumulation {
    users: Vec<UserRecord>,
    pages: u32,
}

/// Keeps a local user store in step with a paginated remote source.
///
/// A sync fetches every remote page first and only then merges: records
/// whose id is not in the store are stamped with the merge time and
/// inserted, records already present are left untouched. A failed fetch
/// therefore never touches the store. A failed insert aborts the merge
/// but keeps what was already written.
///
/// Syncs and local writes through one engine are serialized.
pub struct SyncEngine<S: RemoteUserSource, L: LocalUserStore> {
    config: SyncConfig,
    source: S,
    store: L,
    clock: Arc<dyn Clock>,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
    cancelled: AtomicBool,
    in_flight: Mutex<()>,
}

impl<S: RemoteUserSource, L: LocalUserStore> SyncEngine<S, L> {
    /// Creates a new sync engine.
    pub fn new(config: SyncConfig, source: S, store: L) -> Self {
        Self {
            config,
            source,
            store,
            clock: Arc::new(SystemClock),
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
            cancelled: AtomicBool::new(false),
            in_flight: Mutex::new(()),
        }
    }

    /// Replaces the clock used to stamp new records.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the remote source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the local store.
    pub fn store(&self) -> &L {
        &self.store
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Asks a running sync to stop at the next page or record boundary.
    ///
    /// Every sync clears the flag when it starts, so this only affects a
    /// sync that is already running.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    fn check_cancelled(&self) -> SyncResult<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn set_state(&self, state: SyncState) {
        *self.state.write() = state;
    }

    /// Fetches every remote page and inserts the users the store lacks.
    ///
    /// Returns the newly added records in fetch order. Waits for any sync
    /// or local write already running on this engine.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Fetch`] if a page fails; the store is unchanged
    /// - [`SyncError::Store`] if a store call fails; earlier inserts remain
    /// - [`SyncError::Cancelled`] if [`cancel`](Self::cancel) was called
    pub fn sync_from_remote(&self) -> SyncResult<Vec<UserRecord>> {
        let _guard = self.in_flight.lock();
        self.run_sync()
    }

    /// Like [`sync_from_remote`](Self::sync_from_remote), but fails with
    /// [`SyncError::Busy`] instead of waiting.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Busy`] if the engine is in use, otherwise the
    /// same errors as `sync_from_remote`.
    pub fn try_sync_from_remote(&self) -> SyncResult<Vec<UserRecord>> {
        let Some(_guard) = self.in_flight.try_lock() else {
            debug!("sync skipped, engine busy");
            return Err(SyncError::Busy);
        };
        self.run_sync()
    }

    /// Fetches every remote page without touching the store.
    ///
    /// Records carry the placeholder timestamp the source gave them.
    ///
    /// # Errors
    ///
    /// Returns the first page failure.
    pub fn fetch_all_remote(&self) -> FetchResult<Vec<UserRecord>> {
        self.accumulate(|_| Ok::<(), FetchError>(()))
            .map(|accumulation| accumulation.users)
    }

    /// Returns every locally stored record, in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store cannot be read.
    pub fn load_local(&self) -> SyncResult<Vec<UserRecord>> {
        Ok(self.store.get_all()?)
    }

    fn run_sync(&self) -> SyncResult<Vec<UserRecord>> {
        let start = Instant::now();
        self.reset_cancel();
        info!(base_url = %self.config.base_url, "sync started");

        match self.fetch_and_merge() {
            Ok((accumulation, added)) => {
                self.set_state(SyncState::Done);
                let mut stats = self.stats.write();
                stats.syncs_completed += 1;
                stats.pages_fetched += u64::from(accumulation.pages);
                stats.records_fetched += accumulation.users.len() as u64;
                stats.records_added += added.len() as u64;
                stats.last_sync_time = Some(self.clock.now());
                stats.last_error = None;
                drop(stats);

                info!(
                    pages = accumulation.pages,
                    fetched = accumulation.users.len(),
                    added = added.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "sync finished"
                );
                Ok(added)
            }
            Err(e) => {
                self.handle_error(&e);
                Err(e)
            }
        }
    }

    fn fetch_and_merge(&self) -> SyncResult<(Accumulation, Vec<UserRecord>)> {
        let accumulation = self.accumulate(|page| {
            self.check_cancelled()?;
            self.set_state(SyncState::FetchingPage(page));
            Ok::<(), SyncError>(())
        })?;
        self.set_state(SyncState::Accumulated);

        self.set_state(SyncState::Merging);
        let added = self.merge(&accumulation.users)?;
        Ok((accumulation, added))
    }

    /// Walks the remote pages in order, starting at 1.
    ///
    /// Stops at the reported total when the source gives one, else after
    /// `fixed_page_count` pages when configured, else at the first empty
    /// page. `before_page` runs
    /// ahead of every request.
    fn accumulate<E, F>(&self, mut before_page: F) -> Result<Accumulation, E>
    where
        E: From<FetchError>,
        F: FnMut(u32) -> Result<(), E>,
    {
        let mut users = Vec::new();
        let mut page = 1u32;

        loop {
            if page > self.config.max_pages {
                return Err(FetchError::PageLimitExceeded {
                    page,
                    limit: self.config.max_pages,
                }
                .into());
            }
            before_page(page)?;

            let fetched = self.source.fetch_page(page)?;
            debug!(
                page,
                users = fetched.users.len(),
                total_pages = ?fetched.total_pages,
                "fetched page"
            );

            let last = match (fetched.total_pages, self.config.fixed_page_count) {
                (Some(total), _) => page >= total,
                (None, Some(fixed)) => page >= fixed,
                (None, None) => fetched.is_empty(),
            };
            users.extend(fetched.users);

            if last {
                return Ok(Accumulation { users, pages: page });
            }
            page += 1;
        }
    }

    /// Inserts every record whose id the store does not hold yet.
    fn merge(&self, fetched: &[UserRecord]) -> SyncResult<Vec<UserRecord>> {
        let merged_at = self.clock.now();
        let mut seen = HashSet::with_capacity(fetched.len());
        let mut added = Vec::new();

        for user in fetched {
            self.check_cancelled()?;
            if !seen.insert(user.id) {
                continue;
            }

            let existing = self
                .store
                .get_by_id(user.id)
                .map_err(|e| SyncError::store(Some(user.id), e))?;
            if existing.is_some() {
                continue;
            }

            let user = user.clone().stamped(merged_at);
            if let Err(e) = self.store.insert(&user) {
                warn!(id = %user.id, persisted = added.len(), error = %e, "merge aborted");
                return Err(SyncError::store(Some(user.id), e));
            }
            debug!(id = %user.id, "inserted user");
            added.push(user);
        }

        Ok(added)
    }

    fn handle_error(&self, error: &SyncError) {
        warn!(error = %error, "sync failed");
        self.set_state(SyncState::Failed);
        let mut stats = self.stats.write();
        stats.syncs_failed += 1;
        stats.last_error = Some(error.to_string());
    }

    /// Creates a local user under the next free id.
    ///
    /// The id is one past the highest stored id, or 1 for an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] wrapping `IdsExhausted` if the highest
    /// stored id is `u64::MAX`, or the store failure.
    pub fn add_local_user(&self, new_user: NewUser) -> SyncResult<UserRecord> {
        let _guard = self.in_flight.lock();

        let id = match self.store.max_id()? {
            Some(max) => max.next().ok_or(StoreError::IdsExhausted)?,
            None => UserId::new(1),
        };
        let user = new_user.into_record(id, self.clock.now());
        self.store
            .insert(&user)
            .map_err(|e| SyncError::store(Some(id), e))?;

        info!(id = %id, "added local user");
        Ok(user)
    }

    /// Edits fields of a stored user. Id and `created_at` never change.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] wrapping `NotFound` if no user has this
    /// id, or the store failure.
    pub fn update_local_user(&self, id: UserId, patch: UserPatch) -> SyncResult<UserRecord> {
        let _guard = self.in_flight.lock();

        let mut user = self.require(id)?;
        user.apply_patch(patch);
        self.store
            .update(&user)
            .map_err(|e| SyncError::store(Some(id), e))?;

        info!(id = %id, "updated local user");
        Ok(user)
    }

    /// Removes a stored user and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] wrapping `NotFound` if no user has this
    /// id, or the store failure.
    pub fn delete_local_user(&self, id: UserId) -> SyncResult<UserRecord> {
        let _guard = self.in_flight.lock();

        let user = self.require(id)?;
        self.store
            .delete(&user)
            .map_err(|e| SyncError::store(Some(id), e))?;

        info!(id = %id, "deleted local user");
        Ok(user)
    }

    /// Returns a stored user.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store cannot be read.
    pub fn get_local_user(&self, id: UserId) -> SyncResult<Option<UserRecord>> {
        self.store
            .get_by_id(id)
            .map_err(|e| SyncError::store(Some(id), e))
    }

    /// Runs a view query over the local set.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Store`] if the store cannot be read.
    pub fn query(&self, query: &ViewQuery) -> SyncResult<Projection> {
        let records = self.load_local()?;
        Ok(QueryView::apply_query(&records, query))
    }

    fn require(&self, id: UserId) -> SyncResult<UserRecord> {
        self.get_local_user(id)?
            .ok_or_else(|| SyncError::store(Some(id), StoreError::NotFound(id)))
    }
}
