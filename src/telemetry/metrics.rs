//! Prometheus metrics
//!
//! Thin wrappers over the `metrics` facade. Without an installed recorder
//! every call is a no-op.

use std::time::Duration;

/// How a polling cycle ended
#[derive(Debug, Clone, Copy)]
pub enum CycleMetric {
    /// Cycle reached the diff and persisted a snapshot
    Completed,
    /// Cycle abandoned before the diff
    Abandoned,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Underlyings in the current snapshot
    QualifyingUnderlyings,
    /// Underlyings whose ATM could not be resolved
    AtmSkipped,
    /// Options left after strike windowing
    SelectedOptions,
}

/// Record the end of a cycle and its wall-clock duration
pub fn record_cycle(metric: CycleMetric, duration: Duration) {
    let outcome = match metric {
        CycleMetric::Completed => "completed",
        CycleMetric::Abandoned => "abandoned",
    };

    metrics::counter!("nfowatch_cycles_total", "outcome" => outcome).increment(1);
    metrics::histogram!("nfowatch_cycle_duration_ms").record(duration.as_millis() as f64);
    tracing::debug!(
        metric = "nfowatch_cycles_total",
        outcome,
        duration_ms = duration.as_millis() as u64,
        "Recording cycle"
    );
}

/// Count quote batches that failed and were skipped
pub fn record_failed_batches(count: usize) {
    if count > 0 {
        metrics::counter!("nfowatch_quote_batches_failed_total").increment(count as u64);
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::QualifyingUnderlyings => "nfowatch_qualifying_underlyings",
        GaugeMetric::AtmSkipped => "nfowatch_atm_skipped",
        GaugeMetric::SelectedOptions => "nfowatch_selected_options",
    };

    metrics::gauge!(metric_name).set(value);
}
