//! Notify-test command implementation

use crate::notify::LogNotifier;
use crate::provider::NotificationSink;
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct NotifyTestArgs {
    /// Notification title
    #[arg(default_value = "Options Up 200% Watcher")]
    pub title: String,

    /// Notification message
    #[arg(default_value = "This is a test notification.")]
    pub message: String,
}

impl NotifyTestArgs {
    pub async fn execute(&self) -> anyhow::Result<()> {
        LogNotifier::new()
            .notify(&self.title, &self.message, Duration::from_secs(5))
            .await;
        Ok(())
    }
}
