//! Scheduler state and the status published to readers

use crate::cycle::ContractCycle;
use crate::snapshot::WatchStatus;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Polling loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    #[default]
    Idle,
    CycleRunning,
    Sleeping,
    Terminated,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::CycleRunning => "cycle running",
            Self::Sleeping => "sleeping",
            Self::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// What one completed cycle found
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleOutcome {
    pub started_at: DateTime<Local>,
    pub cycle: ContractCycle,
    pub futures: usize,
    /// Options left after strike windowing
    pub selected_options: usize,
    pub atm_skipped: usize,
    /// Underlyings in the new snapshot
    pub qualifying: usize,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub failed_batches: usize,
}

/// Scheduler status snapshot
///
/// Replaced wholesale on every transition; readers get a consistent copy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerStatus {
    pub state: SchedulerState,
    pub cycles_completed: u64,
    pub cycles_abandoned: u64,
    pub last_outcome: Option<CycleOutcome>,
    /// Error of the most recent abandoned cycle
    pub last_error: Option<String>,
    /// Last persisted status record
    pub watch_status: Option<WatchStatus>,
    pub next_cycle_at: Option<DateTime<Local>>,
}
