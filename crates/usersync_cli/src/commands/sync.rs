//! Sync command implementation.

use serde::Serialize;
use usersync_engine::{RemoteUserSource, SyncEngine, SyncStats};
use usersync_protocol::UserRecord;
use usersync_store::LocalUserStore;

/// Sync result.
#[derive(Debug, Serialize)]
pub struct SyncReport {
    /// Users added by this sync.
    pub added: Vec<UserRecord>,
    /// Pages fetched by this sync.
    pub pages_fetched: u64,
    /// Records fetched by this sync, duplicates included.
    pub records_fetched: u64,
    /// Number of users now stored locally.
    pub local_count: usize,
    /// Engine statistics across every sync since it was opened.
    pub totals: SyncStats,
}

/// Runs the sync command.
pub fn run<S: RemoteUserSource, L: LocalUserStore>(
    engine: &SyncEngine<S, L>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = sync(engine)?;
    match format {
        "json" => println!("{}", super::to_json(&report)?),
        _ => print!("{}", render(&report)),
    }
    Ok(())
}

fn sync<S: RemoteUserSource, L: LocalUserStore>(
    engine: &SyncEngine<S, L>,
) -> Result<SyncReport, Box<dyn std::error::Error>> {
    let before = engine.stats();
    let added = engine.sync_from_remote()?;
    let totals = engine.stats();
    Ok(SyncReport {
        added,
        pages_fetched: totals.pages_fetched - before.pages_fetched,
        records_fetched: totals.records_fetched - before.records_fetched,
        local_count: engine.store().len()?,
        totals,
    })
}

fn render(report: &SyncReport) -> String {
    let mut out = format!(
        "Fetched {} users over {} pages, added {}.\n",
        report.records_fetched,
        report.pages_fetched,
        report.added.len()
    );
    out.push_str(&super::user_lines(&report.added));
    out.push_str(&format!("{} users stored locally.\n", report.local_count));
    out
}
