//! JSON snapshot and status persistence, plus diff records

use super::{Snapshot, SnapshotDiff};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Write `contents` next to `path` and rename it into place
fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)
}

/// The rolling snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last snapshot
    ///
    /// A missing or malformed file yields an empty snapshot. Older files stored
    /// an array of objects; their `name` (or `tradingsymbol`) is used.
    pub fn load(&self) -> Snapshot {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Snapshot::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not read snapshot");
                return Snapshot::default();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(entries)) => Snapshot::from_names(entries.iter().filter_map(entry_name)),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "Snapshot is not an array, starting empty");
                Snapshot::default()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Malformed snapshot, starting empty");
                Snapshot::default()
            }
        }
    }

    pub fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        write_atomic(&self.path, &json)
    }
}

fn entry_name(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(name) => Some(name.as_str()),
        Value::Object(fields) => ["name", "tradingsymbol"]
            .iter()
            .filter_map(|key| fields.get(*key).and_then(Value::as_str))
            .find(|v| !v.trim().is_empty()),
        _ => None,
    }
}

/// Outcome of the last successful cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchStatus {
    /// Local cycle start time, `%Y-%m-%d %H:%M:%S`
    pub last_run: String,
    pub interval_seconds: u64,
    pub added_count: Option<usize>,
    pub removed_count: Option<usize>,
    /// Epoch seconds of the next scheduled cycle start
    pub next_run_eta: i64,
}

impl WatchStatus {
    pub fn new(started_at: &DateTime<Local>, interval_seconds: u64, diff: &SnapshotDiff) -> Self {
        Self {
            last_run: started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            interval_seconds,
            added_count: Some(diff.added.len()),
            removed_count: Some(diff.removed.len()),
            next_run_eta: started_at
                .timestamp()
                .saturating_add(i64::try_from(interval_seconds).unwrap_or(i64::MAX)),
        }
    }
}

/// The status record file
#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last written status, `None` when absent or unreadable
    pub fn load(&self) -> Option<WatchStatus> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Malformed status record");
                None
            }
        }
    }

    pub fn save(&self, status: &WatchStatus) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(status)?;
        write_atomic(&self.path, &json)
    }
}

/// Writes one text file per cycle that added names
#[derive(Debug, Clone)]
pub struct DiffWriter {
    dir: PathBuf,
}

impl DiffWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_name(started_at: &DateTime<Local>) -> String {
        format!("options_up_diff_{}.txt", started_at.format("%Y%m%d_%H%M%S"))
    }

    pub fn render(started_at: &DateTime<Local>, diff: &SnapshotDiff) -> String {
        let mut text = format!(
            "DIFF @ {}\nAdded scripts ({}):\n",
            started_at.format("%Y-%m-%d %H:%M:%S"),
            diff.added.len()
        );
        for name in &diff.added {
            text.push_str("  + ");
            text.push_str(name);
            text.push('\n');
        }
        text
    }

    pub fn write(&self, started_at: &DateTime<Local>, diff: &SnapshotDiff) -> StoreResult<PathBuf> {
        let path = self.dir.join(Self::file_name(started_at));
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        std::fs::write(&path, Self::render(started_at, diff)).map_err(io_err)?;
        Ok(path)
    }
}
