//! Telemetry module
//!
//! Logging and metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use self::metrics::{record_cycle, record_failed_batches, set_gauge, CycleMetric, GaugeMetric};

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Guard that cleans up telemetry on drop
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
///
/// Must run inside a Tokio runtime when a metrics port is configured.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format.into())?;

    if let Some(port) = config.metrics_port {
        init_metrics(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
    }

    Ok(TelemetryGuard { _priv: () })
}

/// Start the Prometheus exporter; failure leaves metrics disabled
fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(%addr, "Prometheus metrics exporter started"),
        Err(e) => tracing::warn!(
            %addr,
            error = %e,
            "Failed to start Prometheus exporter, continuing without metrics"
        ),
    }
}
