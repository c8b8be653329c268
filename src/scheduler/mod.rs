//! Polling scheduler
//!
//! Each cycle: ensure a session, refresh the catalog, resolve the contract
//! cycle, window strikes, scan momentum, diff against the previous snapshot,
//! notify and persist. Cycles run one at a time; a failed cycle is abandoned
//! and retried on the next interval.

mod pipeline;
mod runner;
mod state;

pub use pipeline::{Collaborators, Pipeline, PipelineError};
pub use runner::{sleep_duration, PollingScheduler};
pub use state::{CycleOutcome, SchedulerState, SchedulerStatus};
