//! CLI command implementations.

pub mod edit;
pub mod fetch;
pub mod list;
pub mod show;
pub mod sync;

use crate::client::ReqwestClient;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use usersync_engine::{HttpUserSource, SyncConfig, SyncEngine};
use usersync_protocol::UserRecord;
use usersync_store::FileUserStore;

/// The engine every command runs against.
pub type CliEngine = SyncEngine<HttpUserSource<ReqwestClient>, FileUserStore>;

/// Command failures that are not engine errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// No local user has this id.
    #[error("no user with id {0}")]
    UserNotFound(u64),

    /// An edit with no fields to change.
    #[error("nothing to change; pass at least one field")]
    EmptyEdit,
}

/// Opens the store at `path` and wires it to the remote API.
pub fn open_engine(
    path: &Path,
    base_url: Option<&str>,
) -> Result<CliEngine, Box<dyn std::error::Error>> {
    let config = base_url.map_or_else(SyncConfig::default, SyncConfig::new);
    let client = ReqwestClient::new(config.timeout)?;
    let source = HttpUserSource::new(config.clone(), client);
    let store = FileUserStore::open_with_create_dirs(path)?;
    debug!(path = %path.display(), base_url = %config.base_url, "opened user store");
    Ok(SyncEngine::new(config, source, store))
}

/// One line per user: id, full name, email, discovery time.
pub(crate) fn user_line(user: &UserRecord) -> String {
    format!(
        "{:>5}  {:<28} {:<36} added {}",
        user.id,
        user.full_name(),
        user.email,
        user.created_at
    )
}

pub(crate) fn user_lines(users: &[UserRecord]) -> String {
    users.iter().map(|user| user_line(user) + "\n").collect()
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, Box<dyn std::error::Error>> {
    Ok(serde_json::to_string_pretty(value)?)
}
