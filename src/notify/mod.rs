//! Notification sinks

use crate::provider::NotificationSink;
use async_trait::async_trait;
use std::io::Write;
use std::time::Duration;

/// Terminal notifier: a warn event, a bell and a `[NOTIFY]` line on stdout
#[derive(Debug, Clone)]
pub struct LogNotifier {
    bell: bool,
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LogNotifier {
    pub fn new() -> Self {
        Self { bell: true }
    }

    /// Notifier that never rings the terminal bell
    pub fn quiet() -> Self {
        Self { bell: false }
    }

    pub fn format_line(title: &str, message: &str) -> String {
        format!("[NOTIFY] {title}: {message}")
    }
}

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, title: &str, message: &str, duration: Duration) {
        tracing::warn!(title, message, duration_secs = duration.as_secs(), "Notification");

        let mut stdout = std::io::stdout().lock();
        let bell = if self.bell { "\x07" } else { "" };
        // Delivery is best-effort
        let _ = writeln!(stdout, "{bell}{}", Self::format_line(title, message));
        let _ = stdout.flush();
    }
}
