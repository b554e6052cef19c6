//! User record model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Avatar reference given to locally created users that did not pick one.
pub const DEFAULT_AVATAR: &str = "builtin:person-pin";

/// Identity of a user, shared by the remote and local representations.
///
/// Two records with the same `UserId` are the same logical user.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Creates a user ID from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the ID that follows this one, or `None` past `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// A point in time, stored as milliseconds since the Unix epoch.
///
/// This is also the persisted representation of `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Placeholder for records that have not been discovered locally yet.
    pub const UNSET: Timestamp = Timestamp(0);

    /// Creates a timestamp from epoch milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns epoch milliseconds.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Converts back to a `SystemTime`.
    #[must_use]
    pub fn to_system_time(self) -> SystemTime {
        if self.0 >= 0 {
            UNIX_EPOCH + Duration::from_millis(self.0 as u64)
        } else {
            UNIX_EPOCH - Duration::from_millis(self.0.unsigned_abs())
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(since) => Self(i64::try_from(since.as_millis()).unwrap_or(i64::MAX)),
            Err(before) => Self(-i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX)),
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> Self {
        ts.to_system_time()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user as held in the local store.
///
/// `created_at` records when this identity was first seen locally, not when
/// the remote side created it. It is set once at first insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable identity.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Avatar URI or path, opaque to the core.
    pub avatar: String,
    /// Local discovery time.
    pub created_at: Timestamp,
}

impl UserRecord {
    /// Creates a record.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        avatar: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            avatar: avatar.into(),
            created_at,
        }
    }

    /// Returns `"first last"`, the text searched by name filters.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns true if both records name the same logical user.
    #[must_use]
    pub fn same_identity(&self, other: &UserRecord) -> bool {
        self.id == other.id
    }

    /// Returns a copy with `created_at` replaced.
    #[must_use]
    pub fn stamped(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self
    }

    /// Applies a field-level edit. Identity and `created_at` never change.
    pub fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = avatar;
        }
    }
}

/// Input for a user created locally rather than discovered by sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Avatar reference; [`DEFAULT_AVATAR`] when absent.
    pub avatar: Option<String>,
}

impl NewUser {
    /// Creates the input for a local user without an avatar.
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            avatar: None,
        }
    }

    /// Sets the avatar reference.
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Builds the record under the given identity and creation time.
    #[must_use]
    pub fn into_record(self, id: UserId, created_at: Timestamp) -> UserRecord {
        UserRecord {
            id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            avatar: self.avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            created_at,
        }
    }
}

/// A field-level edit. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// New email address.
    pub email: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New avatar reference.
    pub avatar: Option<String>,
}

impl UserPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.avatar.is_none()
    }
}
