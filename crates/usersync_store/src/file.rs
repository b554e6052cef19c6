//! File-based user store for persistent storage.

use crate::error::{StoreError, StoreResult};
use crate::store::LocalUserStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use usersync_protocol::{UserId, UserRecord};

/// Version written into every store file.
pub const FILE_FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct StoreDocument {
    version: u32,
    users: Vec<UserRecord>,
}

#[derive(Serialize)]
struct StoreDocumentRef<'a> {
    version: u32,
    users: Vec<&'a UserRecord>,
}

/// A file-based user store.
///
/// The whole user table is one JSON document:
///
/// ```text
/// { "version": 1,
///   "users": [ { "id": 1, "email": "...", "first_name": "...",
///                "last_name": "...", "avatar": "...",
///                "created_at": 1700000000000 } ] }
/// ```
///
/// `created_at` is stored as integer epoch milliseconds.
///
/// # Durability
///
/// Every mutation writes the full document to a sibling temp file, syncs
/// it, and renames it over the store file. A crash leaves either the old or
/// the new document, never a mix.
///
/// The cost of a write grows with the table: inserting N users one at a
/// time rewrites and syncs N documents, O(N²) bytes in total. This suits
/// directory-sized tables (a few thousand users); larger sets want a store
/// with incremental writes.
///
/// # Thread Safety
///
/// The in-memory copy is only replaced after the new document is on disk,
/// under the write lock, so readers see each write completely or not at all.
///
/// # Example
///
/// ```no_run
/// use usersync_store::{FileUserStore, LocalUserStore};
/// use std::path::Path;
///
/// let store = FileUserStore::open(Path::new("users.json")).unwrap();
/// println!("{} users", store.len().unwrap());
/// ```
#[derive(Debug)]
pub struct FileUserStore {
    path: PathBuf,
    users: RwLock<BTreeMap<UserId, UserRecord>>,
}

impl FileUserStore {
    /// Opens or creates a store file at the given path.
    ///
    /// If the file exists its contents are loaded. If it doesn't exist, an
    /// empty document is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, or
    /// [`StoreError::Corrupted`] if its contents are not a valid store.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let users = if path.exists() {
            Self::load(path)?
        } else {
            BTreeMap::new()
        };

        let store = Self {
            path: path.to_path_buf(),
            users: RwLock::new(users),
        };

        if !path.exists() {
            store.persist(&store.users.read())?;
        }

        Ok(store)
    }

    /// Opens or creates a store, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the store cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> StoreResult<BTreeMap<UserId, UserRecord>> {
        let bytes = fs::read(path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        let document: StoreDocument = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupted(format!("{}: {}", path.display(), e)))?;

        if document.version != FILE_FORMAT_VERSION {
            return Err(StoreError::Corrupted(format!(
                "unsupported store version {} (expected {})",
                document.version, FILE_FORMAT_VERSION
            )));
        }

        let mut users = BTreeMap::new();
        for user in document.users {
            let id = user.id;
            if users.insert(id, user).is_some() {
                return Err(StoreError::Corrupted(format!("duplicate user id {}", id)));
            }
        }

        tracing::debug!(path = %path.display(), users = users.len(), "loaded user store");
        Ok(users)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persist(&self, users: &BTreeMap<UserId, UserRecord>) -> StoreResult<()> {
        let document = StoreDocumentRef {
            version: FILE_FORMAT_VERSION,
            users: users.values().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| StoreError::Corrupted(format!("failed to encode store: {}", e)))?;

        let temp = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            // Directory fsync is best effort; not every platform allows opening a directory.
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        tracing::debug!(path = %self.path.display(), users = users.len(), "persisted user store");
        Ok(())
    }

    /// Applies `change` to a copy of the table, persists it, then publishes it.
    fn mutate<F>(&self, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<UserId, UserRecord>) -> StoreResult<()>,
    {
        let mut users = self.users.write();
        let mut next = users.clone();
        change(&mut next)?;
        self.persist(&next)?;
        *users = next;
        Ok(())
    }
}

impl LocalUserStore for FileUserStore {
    fn get_all(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.users.read().values().cloned().collect())
    }

    fn get_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.read().get(&id).cloned())
    }

    fn insert(&self, user: &UserRecord) -> StoreResult<()> {
        self.mutate(|users| {
            users.insert(user.id, user.clone());
            Ok(())
        })
    }

    fn update(&self, user: &UserRecord) -> StoreResult<()> {
        self.mutate(|users| match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(user.id)),
        })
    }

    fn delete(&self, user: &UserRecord) -> StoreResult<()> {
        self.mutate(|users| {
            users
                .remove(&user.id)
                .map(|_| ())
                .ok_or(StoreError::NotFound(user.id))
        })
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.users.read().len())
    }

    fn max_id(&self) -> StoreResult<Option<UserId>> {
        Ok(self.users.read().keys().next_back().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use usersync_protocol::Timestamp;

    fn user(id: u64, first: &str) -> UserRecord {
        UserRecord::new(
            UserId::new(id),
            format!("{}@example.com", first.to_lowercase()),
            first,
            "Test",
            format!("https://img/{id}.png"),
            Timestamp::from_millis(1_700_000_000_000 + id as i64),
        )
    }

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");

        let store = FileUserStore::open(&path).unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn file_insert_and_get() {
        let dir = tempdir().unwrap();
        let store = FileUserStore::open(&dir.path().join("users.json")).unwrap();

        store.insert(&user(1, "Ann")).unwrap();
        store.insert(&user(2, "Bob")).unwrap();

        assert_eq!(store.get_by_id(UserId::new(2)).unwrap(), Some(user(2, "Bob")));
        assert_eq!(store.get_all().unwrap().len(), 2);
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");

        {
            let store = FileUserStore::open(&path).unwrap();
            store.insert(&user(1, "Ann")).unwrap();
            store.insert(&user(5, "Eve")).unwrap();
            let mut edited = user(5, "Eve");
            edited.first_name = "Evelyn".into();
            store.update(&edited).unwrap();
        }

        {
            let store = FileUserStore::open(&path).unwrap();
            let users = store.get_all().unwrap();
            assert_eq!(users.len(), 2);
            assert_eq!(users[1].first_name, "Evelyn");
            assert_eq!(
                users[1].created_at,
                Timestamp::from_millis(1_700_000_000_005)
            );
        }
    }

    #[test]
    fn file_each_insert_is_durable_on_its_own() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = FileUserStore::open(&path).unwrap();

        for id in 1..=3 {
            store.insert(&user(id, "Ann")).unwrap();
            let on_disk = FileUserStore::open(&path).unwrap();
            assert_eq!(on_disk.len().unwrap(), id as usize);
            assert_eq!(on_disk.max_id().unwrap(), Some(UserId::new(id)));
        }
    }

    #[test]
    fn file_schema_uses_epoch_millis() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = FileUserStore::open(&path).unwrap();
        store.insert(&user(3, "Cy")).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["version"], FILE_FORMAT_VERSION);
        assert_eq!(json["users"][0]["id"], 3);
        assert_eq!(json["users"][0]["created_at"], 1_700_000_000_003_i64);
    }

    #[test]
    fn file_update_missing_fails_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = FileUserStore::open(&path).unwrap();
        store.insert(&user(1, "Ann")).unwrap();
        let before = fs::read(&path).unwrap();

        assert!(matches!(
            store.update(&user(2, "Bob")),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn file_delete() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = FileUserStore::open(&path).unwrap();
        store.insert(&user(1, "Ann")).unwrap();
        store.delete(&user(1, "Ann")).unwrap();

        assert!(store.is_empty().unwrap());
        assert!(matches!(
            store.delete(&user(1, "Ann")),
            Err(StoreError::NotFound(_))
        ));
        assert!(FileUserStore::open(&path).unwrap().is_empty().unwrap());
    }

    #[test]
    fn file_corrupted_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(
            FileUserStore::open(&path),
            Err(StoreError::Corrupted(_))
        ));
    }

    #[test]
    fn file_unknown_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, br#"{"version": 99, "users": []}"#).unwrap();

        assert!(matches!(
            FileUserStore::open(&path),
            Err(StoreError::Corrupted(_))
        ));
    }

    #[test]
    fn file_duplicate_ids_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let row = r#"{"id":1,"email":"","first_name":"A","last_name":"B","avatar":"","created_at":0}"#;
        fs::write(&path, format!(r#"{{"version":1,"users":[{row},{row}]}}"#)).unwrap();

        assert!(matches!(
            FileUserStore::open(&path),
            Err(StoreError::Corrupted(_))
        ));
    }

    #[test]
    fn file_empty_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, b"").unwrap();

        let store = FileUserStore::open(&path).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("users.json");

        let store = FileUserStore::open_with_create_dirs(&path).unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert_eq!(store.path(), path);
        assert!(path.exists());
    }

    #[test]
    fn file_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = FileUserStore::open(&path).unwrap();
        store.insert(&user(1, "Ann")).unwrap();

        assert!(!dir.path().join("users.json.tmp").exists());
    }
}
