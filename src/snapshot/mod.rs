//! Snapshot diffing and persistence
//!
//! The snapshot is the only state carried between cycles: the set of
//! underlyings that qualified last time.

mod diff;
mod store;

pub use diff::{Snapshot, SnapshotDiff};
pub use store::{DiffWriter, SnapshotStore, StatusStore, StoreError, StoreResult, WatchStatus};
