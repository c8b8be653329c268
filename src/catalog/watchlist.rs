//! Watch-list of underlying names

use std::collections::BTreeSet;
use std::path::Path;

/// Upper-cased set of underlying names scoping the catalog
///
/// An empty list means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchList {
    names: BTreeSet<String>,
}

impl WatchList {
    /// Parse a newline-delimited list, skipping blank lines
    pub fn parse(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_uppercase)
            .collect();
        Self { names }
    }

    /// Load from disk; a missing or unreadable file yields an empty list
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::parse(&content);
                tracing::info!(path = %path.display(), names = list.len(), "Loaded watch-list");
                list
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Watch-list unavailable, using entire catalog"
                );
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Case-insensitive membership
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.trim().to_uppercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
