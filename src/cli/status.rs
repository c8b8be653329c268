//! Status command implementation

use crate::config::Config;
use crate::snapshot::{SnapshotStore, StatusStore};
use chrono::{Local, TimeZone};
use clap::Args;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the status record as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let status = StatusStore::new(config.storage.status_path()).load();
        let snapshot = SnapshotStore::new(config.storage.snapshot_path()).load();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }

        println!("nfo-watch status");
        match &status {
            Some(status) => {
                let next = Local
                    .timestamp_opt(status.next_run_eta, 0)
                    .single()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| status.next_run_eta.to_string());
                let count = |c: Option<usize>| c.map_or_else(|| "-".to_string(), |c| c.to_string());
                println!("  Last run: {}", status.last_run);
                println!("  Interval: {}s", status.interval_seconds);
                println!("  Added: {}", count(status.added_count));
                println!("  Removed: {}", count(status.removed_count));
                println!("  Next run: {}", next);
            }
            None => println!("  No completed cycle recorded"),
        }

        println!("  Qualifying underlyings: {}", snapshot.len());
        for name in snapshot.names() {
            println!("    {name}");
        }
        Ok(())
    }
}
