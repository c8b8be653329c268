//! Fixed-interval polling loop

use super::{CycleOutcome, Pipeline, PipelineError, SchedulerState, SchedulerStatus};
use crate::telemetry::{record_cycle, CycleMetric};
use chrono::Local;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Time left in the interval after a cycle took `elapsed`
///
/// Whole seconds only; a slow cycle starts the next one immediately.
pub fn sleep_duration(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(Duration::from_secs(elapsed.as_secs()))
}

/// Drives the pipeline once per interval until cancelled
pub struct PollingScheduler {
    pipeline: Pipeline,
    interval: Duration,
    status: watch::Sender<SchedulerStatus>,
}

impl PollingScheduler {
    pub fn new(pipeline: Pipeline) -> Self {
        let interval = pipeline.interval();
        let status = SchedulerStatus {
            watch_status: pipeline.last_status().cloned(),
            ..Default::default()
        };
        let (status, _) = watch::channel(status);
        Self {
            pipeline,
            interval,
            status,
        }
    }

    /// Receiver for status updates
    pub fn subscribe(&self) -> watch::Receiver<SchedulerStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status.borrow().clone()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run a single cycle and record it in the status
    pub async fn run_once(&mut self) -> Result<CycleOutcome, PipelineError> {
        self.set_state(SchedulerState::CycleRunning);
        let (result, elapsed) = self.execute_cycle().await;
        self.publish(&result, elapsed);
        self.set_state(SchedulerState::Idle);
        result
    }

    /// Poll until `cancel` fires
    ///
    /// Cancellation is honoured between cycles and while sleeping; a running
    /// cycle always completes.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Starting watcher");

        while !cancel.is_cancelled() {
            self.set_state(SchedulerState::CycleRunning);
            let started = Instant::now();
            self.scheduled_cycle().await;

            if cancel.is_cancelled() {
                break;
            }

            let pause = sleep_duration(self.interval, started.elapsed());
            let next = Local::now() + chrono::Duration::from_std(pause).unwrap_or(chrono::Duration::zero());
            self.status.send_modify(|s| {
                s.state = SchedulerState::Sleeping;
                s.next_cycle_at = Some(next);
            });
            tracing::info!(sleep_secs = pause.as_secs(), next = %next.format("%H:%M:%S"), "Sleeping");

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        self.status.send_modify(|s| {
            s.state = SchedulerState::Terminated;
            s.next_cycle_at = None;
        });
        tracing::info!("Watcher stopped");
    }

    /// Loop body; an abandoned cycle is published and retried next interval
    async fn scheduled_cycle(&mut self) {
        let (result, elapsed) = self.execute_cycle().await;
        self.publish(&result, elapsed);
    }

    async fn execute_cycle(&mut self) -> (Result<CycleOutcome, PipelineError>, Duration) {
        let started_at = Local::now();
        let clock = Instant::now();
        tracing::info!(run = %started_at.format("%Y-%m-%d %H:%M:%S"), "Cycle started");

        let result = self.pipeline.run_cycle(started_at).await;
        (result, clock.elapsed())
    }

    fn publish(&self, result: &Result<CycleOutcome, PipelineError>, elapsed: Duration) {
        match result {
            Ok(outcome) => {
                record_cycle(CycleMetric::Completed, elapsed);
                tracing::info!(
                    cycle = %outcome.cycle.code,
                    qualifying = outcome.qualifying,
                    added = outcome.added.len(),
                    removed = outcome.removed.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Cycle completed"
                );
                let watch_status = self.pipeline.last_status().cloned();
                self.status.send_modify(|s| {
                    s.cycles_completed += 1;
                    s.last_outcome = Some(outcome.clone());
                    s.last_error = None;
                    s.watch_status = watch_status;
                });
            }
            Err(e) => {
                record_cycle(CycleMetric::Abandoned, elapsed);
                tracing::error!(error = %e, "Cycle abandoned, retrying next interval");
                let message = e.to_string();
                self.status.send_modify(|s| {
                    s.cycles_abandoned += 1;
                    s.last_error = Some(message);
                });
            }
        }
    }

    fn set_state(&self, state: SchedulerState) {
        tracing::debug!(state = %state, "Scheduler state");
        self.status.send_modify(|s| s.state = state);
    }
}
