//! Fetch command implementation.

use usersync_engine::{RemoteUserSource, SyncEngine};
use usersync_store::LocalUserStore;

/// Runs the fetch command.
pub fn run<S: RemoteUserSource, L: LocalUserStore>(
    engine: &SyncEngine<S, L>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = engine.fetch_all_remote()?;

    match format {
        "json" => println!("{}", super::to_json(&users)?),
        _ => {
            println!("{} remote users", users.len());
            for user in &users {
                println!("{:>5}  {:<28} {}", user.id, user.full_name(), user.email);
            }
        }
    }

    Ok(())
}
