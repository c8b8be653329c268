//! CLI interface for nfo-watch
//!
//! Provides subcommands for:
//! - `watch`: Run the polling watcher
//! - `status`: Show the last persisted status and snapshot
//! - `config`: Show the effective configuration
//! - `notify-test`: Send a test notification

mod notify;
mod status;
mod watch;

pub use notify::NotifyTestArgs;
pub use status::StatusArgs;
pub use watch::WatchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nfo-watch")]
#[command(about = "Watch current-cycle NFO options for moves past a threshold since the open")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the polling watcher
    Watch(WatchArgs),
    /// Show the last persisted status and snapshot
    Status(StatusArgs),
    /// Show the effective configuration
    Config,
    /// Send a test notification
    NotifyTest(NotifyTestArgs),
}
