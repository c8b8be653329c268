//! Snapshot of qualifying underlyings and the diff between two snapshots

use crate::momentum::MomentumRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Upper-case, deduplicated, sorted underlying names qualifying now
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeSet<String>);

impl Snapshot {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|n| n.as_ref().trim().to_uppercase())
                .filter(|n| !n.is_empty())
                .collect(),
        )
    }

    /// Collapse momentum records to their underlying names
    pub fn from_records(records: &[MomentumRecord<'_>]) -> Self {
        Self::from_names(records.iter().map(MomentumRecord::snapshot_name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&name.trim().to_uppercase())
    }

    /// Names added and removed going from `self` to `current`
    pub fn diff(&self, current: &Snapshot) -> SnapshotDiff {
        SnapshotDiff {
            added: current.0.difference(&self.0).cloned().collect(),
            removed: self.0.difference(&current.0).cloned().collect(),
        }
    }
}

/// Sorted additions and removals between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
