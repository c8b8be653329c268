//! Watch command implementation

use crate::config::Config;
use crate::kite::{EnvSession, KiteClient};
use crate::notify::LogNotifier;
use crate::scheduler::{Collaborators, Pipeline, PollingScheduler};
use clap::Args;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between cycle starts (overrides the config file)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,
}

impl WatchArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if let Some(interval) = self.interval {
            config.scheduler.interval_seconds = interval;
        }

        let client = Arc::new(KiteClient::new(&config.kite, &config.contracts)?);
        let services = Collaborators {
            session: Arc::new(EnvSession::new(client.clone(), &config.kite)),
            catalog: client.clone(),
            quotes: client.clone(),
            spot: client,
            notifier: Arc::new(LogNotifier::new()),
        };
        let mut scheduler = PollingScheduler::new(Pipeline::new(config, services));

        if self.once {
            let outcome = scheduler.run_once().await?;
            println!(
                "Cycle {}{}: {} qualifying, {} added, {} removed",
                outcome.cycle.code,
                if outcome.cycle.is_fallback { " (fallback)" } else { "" },
                outcome.qualifying,
                outcome.added.len(),
                outcome.removed.len()
            );
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping after the current cycle");
                signal.cancel();
            }
        });

        scheduler.run(cancel).await;
        Ok(())
    }
}
