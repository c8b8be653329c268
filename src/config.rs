//! Configuration types for nfo-watch
//!
//! Every section is optional; missing keys fall back to the built-in defaults.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub contracts: ContractsConfig,
    pub scan: ScanConfig,
    pub kite: KiteConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

/// Polling scheduler configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between cycle starts
    pub interval_seconds: u64,
    /// Send a notification when new underlyings qualify
    pub notify_on_change: bool,
    /// Also notify when nothing changed
    pub notify_always: bool,
    pub notification_title: String,
    pub notification_duration_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            notify_on_change: true,
            notify_always: false,
            notification_title: "Options Up 200% Changed".to_string(),
            notification_duration_secs: 5,
        }
    }
}

/// Contract universe and cycle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Exchange segment holding the derivatives (e.g. "NFO")
    pub segment: String,
    /// Exchange used for underlying spot quotes (e.g. "NSE")
    pub spot_exchange: String,
    /// Explicit cycle code such as "25OCT"; empty means auto
    pub month_override: String,
    /// Retry with the next calendar month when the current one has no futures
    pub fallback_next_month: bool,
    /// Newline-delimited list of underlying names
    pub watchlist_path: PathBuf,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            segment: "NFO".to_string(),
            spot_exchange: "NSE".to_string(),
            month_override: String::new(),
            fallback_next_month: true,
            watchlist_path: PathBuf::from("data/Nfo_List.txt"),
        }
    }
}

impl ContractsConfig {
    /// Cycle override, if one is configured
    pub fn month_override(&self) -> Option<&str> {
        let trimmed = self.month_override.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Strike window and momentum scan configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Strikes kept on each side of the ATM strike
    pub max_strikes: usize,
    /// Minimum percentage gain since session open
    pub threshold_percent: Decimal,
    /// Symbols per quote request during the momentum scan
    pub quote_batch_size: usize,
    /// Symbols per LTP request during enrichment
    pub ltp_batch_size: usize,
    /// Symbols per full quote request during enrichment
    pub full_quote_batch_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_strikes: 5,
            threshold_percent: Decimal::new(200, 0),
            quote_batch_size: 100,
            ltp_batch_size: 1000,
            full_quote_batch_size: 500,
        }
    }
}

/// Kite Connect API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KiteConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Environment variable holding the session access token
    pub access_token_env: String,
}

impl Default for KiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.kite.trade".to_string(),
            timeout_secs: 30,
            api_key_env: "KITE_API_KEY".to_string(),
            access_token_env: "KITE_ACCESS_TOKEN".to_string(),
        }
    }
}

/// Snapshot, status and diff file locations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

impl StorageConfig {
    pub fn snapshot_path(&self) -> PathBuf {
        self.output_dir.join("options_up_latest.json")
    }

    pub fn status_path(&self) -> PathBuf {
        self.output_dir.join("watcher_status.json")
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormatConfig,
    /// Port for the Prometheus exporter; disabled when absent
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormatConfig::Pretty,
            metrics_port: None,
        }
    }
}

/// Log output format as written in the config file
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatConfig {
    #[default]
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing or malformed
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Could not load config from {}: {}",
                    path.display(),
                    e
                );
                eprintln!("Using default configuration");
                Self::default()
            }
        }
    }
}
