//! One polling cycle, end to end

use super::CycleOutcome;
use crate::catalog::{InstrumentCatalog, WatchList};
use crate::config::Config;
use crate::cycle::{select_contracts, ContractCycleResolver, ContractSet, CycleError};
use crate::momentum::MomentumScanner;
use crate::provider::{
    CatalogProvider, NotificationSink, ProviderError, QuoteProvider, SessionProvider,
    SpotPriceProvider,
};
use crate::quotes::enrich_from_provider;
use crate::snapshot::{DiffWriter, Snapshot, SnapshotDiff, SnapshotStore, StatusStore, WatchStatus};
use crate::strikes::filter_atm_otm;
use crate::telemetry::{record_failed_batches, set_gauge, GaugeMetric};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const NO_CHANGE_TITLE: &str = "Options Up 200% Watcher";
const NO_CHANGE_MESSAGE: &str = "No change since last run";

/// Reasons a cycle is abandoned before the diff
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Authentication failed: {0}")]
    Auth(#[source] ProviderError),
    #[error("Catalog refresh failed: {0}")]
    Catalog(#[source] ProviderError),
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// External services a cycle talks to
#[derive(Clone)]
pub struct Collaborators {
    pub session: Arc<dyn SessionProvider>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub quotes: Arc<dyn QuoteProvider>,
    pub spot: Arc<dyn SpotPriceProvider>,
    pub notifier: Arc<dyn NotificationSink>,
}

/// Cycle pipeline owning the previous snapshot and the stores
pub struct Pipeline {
    config: Config,
    services: Collaborators,
    catalog: InstrumentCatalog,
    resolver: ContractCycleResolver,
    scanner: MomentumScanner,
    snapshots: SnapshotStore,
    statuses: StatusStore,
    diffs: DiffWriter,
    previous: Snapshot,
    last_status: Option<WatchStatus>,
}

impl Pipeline {
    /// Build the pipeline, loading the persisted snapshot and status
    pub fn new(config: Config, services: Collaborators) -> Self {
        let snapshots = SnapshotStore::new(config.storage.snapshot_path());
        let statuses = StatusStore::new(config.storage.status_path());
        let previous = snapshots.load();
        let last_status = statuses.load();
        tracing::info!(
            path = %snapshots.path().display(),
            names = previous.len(),
            "Loaded previous snapshot"
        );

        Self {
            resolver: ContractCycleResolver::new(&config.contracts),
            scanner: MomentumScanner::new(&config.scan),
            diffs: DiffWriter::new(config.storage.output_dir.clone()),
            catalog: InstrumentCatalog::new(),
            config,
            services,
            snapshots,
            statuses,
            previous,
            last_status,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.config.scheduler.interval_seconds)
    }

    /// Snapshot the next diff is taken against
    pub fn previous_snapshot(&self) -> &Snapshot {
        &self.previous
    }

    pub fn last_status(&self) -> Option<&WatchStatus> {
        self.last_status.as_ref()
    }

    /// Run one cycle started at `started_at`
    ///
    /// An error means the cycle was abandoned before the diff; the snapshot and
    /// status record are then left as they were.
    pub async fn run_cycle(
        &mut self,
        started_at: DateTime<Local>,
    ) -> Result<CycleOutcome, PipelineError> {
        self.services
            .session
            .ensure_session()
            .await
            .map_err(PipelineError::Auth)?;

        let watchlist = WatchList::load(&self.config.contracts.watchlist_path);
        self.catalog
            .refresh(
                self.services.catalog.as_ref(),
                &self.config.contracts.segment,
                &watchlist,
            )
            .await
            .map_err(PipelineError::Catalog)?;

        let mut contracts =
            select_contracts(self.catalog.instruments(), &self.resolver, started_at.date_naive())?;
        log_coverage(&contracts, &watchlist);

        let enrich_failures = self.enrich(&mut contracts).await;

        let selection = filter_atm_otm(
            &contracts,
            self.services.spot.as_ref(),
            self.config.scan.max_strikes,
        )
        .await;

        let scan = self
            .scanner
            .run(self.services.quotes.as_ref(), &selection.options)
            .await;
        let current = Snapshot::from_records(&scan.records);
        for record in scan.records.iter().take(10) {
            tracing::info!(
                symbol = %record.instrument.tradingsymbol,
                open = %record.open_price,
                last = %record.current_price,
                change_pct = %record.percent_change.round_dp(2),
                volume = record.volume,
                "Momentum mover"
            );
        }

        let diff = self.previous.diff(&current);
        self.dispatch(started_at, &diff).await;
        self.persist(started_at, current, &diff);

        let failed_batches = enrich_failures + scan.failed_batches;
        record_failed_batches(failed_batches);
        set_gauge(GaugeMetric::QualifyingUnderlyings, self.previous.len() as f64);
        set_gauge(GaugeMetric::AtmSkipped, selection.report.skipped as f64);
        set_gauge(GaugeMetric::SelectedOptions, selection.options.len() as f64);

        Ok(CycleOutcome {
            started_at,
            cycle: contracts.cycle.clone(),
            futures: contracts.futures.len(),
            selected_options: selection.options.len(),
            atm_skipped: selection.report.skipped,
            qualifying: self.previous.len(),
            added: diff.added,
            removed: diff.removed,
            failed_batches,
        })
    }

    /// Enrich futures and options in one batched pass; returns failed batches
    async fn enrich(&self, contracts: &mut ContractSet) -> usize {
        let futures = contracts.futures.len();
        let mut all = std::mem::take(&mut contracts.futures);
        all.append(&mut contracts.options);

        let report = enrich_from_provider(self.services.quotes.as_ref(), &mut all, &self.config.scan).await;

        contracts.options = all.split_off(futures);
        contracts.futures = all;
        report.failed_batches
    }

    async fn dispatch(&self, started_at: DateTime<Local>, diff: &SnapshotDiff) {
        let scheduler = &self.config.scheduler;
        let duration = Duration::from_secs(scheduler.notification_duration_secs);

        if diff.added.is_empty() {
            tracing::info!(removed = diff.removed.len(), "No new qualifying underlyings");
            if scheduler.notify_always {
                let duration = Duration::from_secs(scheduler.notification_duration_secs.saturating_sub(1).max(3));
                self.services
                    .notifier
                    .notify(NO_CHANGE_TITLE, NO_CHANGE_MESSAGE, duration)
                    .await;
            }
            return;
        }

        tracing::warn!(
            added = diff.added.len(),
            names = ?diff.added,
            removed = diff.removed.len(),
            "New qualifying underlyings"
        );
        if scheduler.notify_on_change {
            let message = format!("Added scripts: {}", diff.added.len());
            self.services
                .notifier
                .notify(&scheduler.notification_title, &message, duration)
                .await;
        }

        match self.diffs.write(&started_at, diff) {
            Ok(path) => tracing::info!(path = %path.display(), "Diff saved"),
            Err(e) => tracing::warn!(error = %e, "Failed to write diff record"),
        }
    }

    fn persist(&mut self, started_at: DateTime<Local>, current: Snapshot, diff: &SnapshotDiff) {
        if let Err(e) = self.snapshots.save(&current) {
            tracing::warn!(error = %e, "Failed to persist snapshot");
        }
        self.previous = current;

        let status = WatchStatus::new(&started_at, self.config.scheduler.interval_seconds, diff);
        if let Err(e) = self.statuses.save(&status) {
            tracing::warn!(error = %e, "Failed to persist status record");
        }
        self.last_status = Some(status);
    }
}

fn log_coverage(contracts: &ContractSet, watchlist: &WatchList) {
    if watchlist.is_empty() {
        return;
    }
    let report = contracts.coverage(watchlist);
    tracing::info!(
        cycle = %contracts.cycle.code,
        fallback = contracts.cycle.is_fallback,
        with_futures = report.with_futures,
        with_options = report.with_options,
        with_any = report.with_any,
        watchlist = watchlist.len(),
        "Cycle coverage"
    );
    if !report.missing.is_empty() {
        tracing::debug!(missing = ?report.missing, "Watch-list names without cycle contracts");
    }
}
