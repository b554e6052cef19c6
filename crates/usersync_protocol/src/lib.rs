//! # usersync Protocol
//!
//! User record model and remote wire format for usersync.
//!
//! This crate provides:
//! - [`UserRecord`], the entity flowing through every usersync component
//! - [`UserId`] and [`Timestamp`] newtypes
//! - [`NewUser`] and [`UserPatch`] for local creation and field-level edits
//! - The JSON page format returned by the remote user API ([`UsersPage`])
//!
//! This is a pure data crate with no I/O operations.
//!
//! ## Example
//!
//! ```rust
//! use usersync_protocol::{Timestamp, UsersPage};
//!
//! let body = br#"{"data":[{"id":1,"email":"a@b.c","first_name":"Ann","last_name":"Lee","avatar":"a.png"}],"total_pages":2}"#;
//! let page = UsersPage::decode(body).unwrap();
//! assert_eq!(page.total_pages, Some(2));
//!
//! let user = page.data[0].clone().into_record(Timestamp::from_millis(0));
//! assert_eq!(user.full_name(), "Ann Lee");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod record;
mod wire;

pub use error::{ProtocolError, ProtocolResult};
pub use record::{NewUser, Timestamp, UserId, UserPatch, UserRecord, DEFAULT_AVATAR};
pub use wire::{RemoteUser, UsersPage};
