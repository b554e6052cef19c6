//! List command implementation.

use usersync_engine::{Projection, RemoteUserSource, SyncEngine, ViewQuery};
use usersync_store::LocalUserStore;

/// Runs the list command.
pub fn run<S: RemoteUserSource, L: LocalUserStore>(
    engine: &SyncEngine<S, L>,
    query: &ViewQuery,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let projection = engine.query(query)?;

    match format {
        "json" => println!("{}", super::to_json(&projection)?),
        _ => print!("{}", render(&projection, query)),
    }

    Ok(())
}

fn render(projection: &Projection, query: &ViewQuery) -> String {
    let mut out = super::user_lines(&projection.items);
    if projection.items.is_empty() {
        out.push_str("No users on this page.\n");
    }

    let mut footer = format!(
        "Page {} of {} ({} matching, sorted by {})",
        projection.page, projection.total_pages, projection.total_matches, query.sort
    );
    if projection.has_previous() {
        footer.push_str(&format!(" | prev: --page {}", projection.page - 1));
    }
    if projection.has_next() {
        footer.push_str(&format!(" | next: --page {}", projection.page + 1));
    }
    out.push_str(&footer);
    out.push('\n');
    out
}
