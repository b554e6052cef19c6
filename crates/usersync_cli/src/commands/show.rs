//! Show command implementation.

use super::CliError;
use usersync_engine::{RemoteUserSource, SyncEngine};
use usersync_protocol::{UserId, UserRecord};
use usersync_store::LocalUserStore;

/// Runs the show command.
pub fn run<S: RemoteUserSource, L: LocalUserStore>(
    engine: &SyncEngine<S, L>,
    id: u64,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = engine
        .get_local_user(UserId::new(id))?
        .ok_or(CliError::UserNotFound(id))?;

    match format {
        "json" => println!("{}", super::to_json(&user)?),
        _ => print!("{}", render(&user)),
    }

    Ok(())
}

pub(crate) fn render(user: &UserRecord) -> String {
    format!(
        "ID:         {}\nName:       {}\nEmail:      {}\nAvatar:     {}\nAdded (ms): {}\n",
        user.id,
        user.full_name(),
        user.email,
        user.avatar,
        user.created_at
    )
}
