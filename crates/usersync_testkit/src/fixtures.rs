//! Test fixtures and store helpers.
//!
//! Provides user builders, the reqres.in sample directory and temporary
//! file-backed stores.

use std::ops::Deref;
use std::path::PathBuf;
use tempfile::TempDir;
use usersync_protocol::{RemoteUser, Timestamp, UserId, UserRecord, UsersPage};
use usersync_store::FileUserStore;

/// Builds a record as the remote side would describe it (no local time yet).
pub fn remote_user(id: u64, first_name: &str, last_name: &str) -> UserRecord {
    UserRecord::new(
        UserId::new(id),
        format!(
            "{}.{}@reqres.in",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        first_name,
        last_name,
        format!("https://reqres.in/img/faces/{id}-image.jpg"),
        Timestamp::UNSET,
    )
}

/// Builds a record already stored locally at `created_at` milliseconds.
pub fn local_user(id: u64, first_name: &str, last_name: &str, created_at: i64) -> UserRecord {
    remote_user(id, first_name, last_name).stamped(Timestamp::from_millis(created_at))
}

/// The twelve users served by reqres.in, in server order.
pub fn reqres_users() -> Vec<UserRecord> {
    [
        (1, "George", "Bluth"),
        (2, "Janet", "Weaver"),
        (3, "Emma", "Wong"),
        (4, "Eve", "Holt"),
        (5, "Charles", "Morris"),
        (6, "Tracey", "Ramos"),
        (7, "Michael", "Lawson"),
        (8, "Lindsay", "Ferguson"),
        (9, "Tobias", "Funke"),
        (10, "Byron", "Fields"),
        (11, "George", "Edwards"),
        (12, "Rachel", "Howell"),
    ]
    .into_iter()
    .map(|(id, first, last)| remote_user(id, first, last))
    .collect()
}

/// Splits records into consecutive pages of `per_page`.
///
/// # Panics
///
/// Panics if `per_page` is zero.
pub fn split_pages(users: Vec<UserRecord>, per_page: usize) -> Vec<Vec<UserRecord>> {
    assert!(per_page > 0, "per_page must be positive");
    users.chunks(per_page).map(<[UserRecord]>::to_vec).collect()
}

/// Renders one page as the JSON body the remote API would return.
pub fn page_body(users: &[UserRecord], page: u32, per_page: u32, total: u64) -> Vec<u8> {
    let total_pages = u32::try_from(total.div_ceil(u64::from(per_page.max(1)))).unwrap_or(u32::MAX);
    let page = UsersPage {
        data: users.iter().map(RemoteUser::from).collect(),
        page: Some(page),
        per_page: Some(per_page),
        total: Some(total),
        total_pages: Some(total_pages),
    };
    serde_json::to_vec(&page).expect("users page serializes")
}

/// A file-backed store in a temporary directory, removed on drop.
pub struct TestStore {
    store: FileUserStore,
    dir: TempDir,
}

impl TestStore {
    /// Opens an empty store at `<tempdir>/users.json`.
    pub fn file() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store =
            FileUserStore::open(&dir.path().join("users.json")).expect("Failed to open store");
        Self { store, dir }
    }

    /// Returns the store file path.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("users.json")
    }

    /// Opens a second handle on the same file, as a restarted process would.
    pub fn reopen(&self) -> FileUserStore {
        FileUserStore::open(&self.path()).expect("Failed to reopen store")
    }
}

impl Deref for TestStore {
    type Target = FileUserStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}
