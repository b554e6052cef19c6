//! Local user maintenance: add, edit and delete.

use super::CliError;
use usersync_engine::{RemoteUserSource, SyncEngine};
use usersync_protocol::{NewUser, UserId, UserPatch};
use usersync_store::LocalUserStore;

/// Runs the add command.
pub fn add<S: RemoteUserSource, L: LocalUserStore>(
    engine: &SyncEngine<S, L>,
    new_user: NewUser,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = engine.add_local_user(new_user)?;
    println!("Added user {}", user.id);
    print!("{}", super::show::render(&user));
    Ok(())
}

/// Runs the edit command.
pub fn edit<S: RemoteUserSource, L: LocalUserStore>(
    engine: &SyncEngine<S, L>,
    id: u64,
    patch: UserPatch,
) -> Result<(), Box<dyn std::error::Error>> {
    if patch.is_empty() {
        return Err(CliError::EmptyEdit.into());
    }
    let user = engine.update_local_user(UserId::new(id), patch)?;
    println!("Updated user {}", user.id);
    print!("{}", super::show::render(&user));
    Ok(())
}

/// Runs the delete command.
pub fn delete<S: RemoteUserSource, L: LocalUserStore>(
    engine: &SyncEngine<S, L>,
    id: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = engine.delete_local_user(UserId::new(id))?;
    println!("Deleted user {} ({})", user.id, user.full_name());
    Ok(())
}
