//! Instrument catalog for one exchange segment

use super::{Instrument, WatchList};
use crate::provider::{CatalogProvider, ProviderResult};
use std::collections::BTreeSet;

/// Holds the instrument universe of one segment, scoped by the watch-list
#[derive(Debug, Default)]
pub struct InstrumentCatalog {
    instruments: Vec<Instrument>,
    /// Watch-list names with no instrument in the last refresh
    missing: Vec<String>,
}

impl InstrumentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the segment and replace the universe
    ///
    /// On error the previous universe is left untouched.
    pub async fn refresh(
        &mut self,
        provider: &dyn CatalogProvider,
        segment: &str,
        watchlist: &WatchList,
    ) -> ProviderResult<usize> {
        let fetched = provider.fetch_instruments(segment).await?;
        tracing::info!(segment, total = fetched.len(), "Retrieved instruments");
        self.replace(fetched, watchlist);
        Ok(self.instruments.len())
    }

    /// Replace the universe with `instruments` filtered by `watchlist`
    pub fn replace(&mut self, instruments: Vec<Instrument>, watchlist: &WatchList) {
        if watchlist.is_empty() {
            tracing::warn!("No watch-list loaded, using all instruments");
            self.instruments = instruments;
            self.missing.clear();
            return;
        }

        self.instruments = instruments
            .into_iter()
            .filter(|i| watchlist.contains(&i.name))
            .collect();

        let found: BTreeSet<String> = self.instruments.iter().map(Instrument::underlying).collect();
        self.missing = watchlist
            .names()
            .filter(|name| !found.contains(*name))
            .map(str::to_string)
            .collect();

        tracing::info!(
            kept = self.instruments.len(),
            watchlist = watchlist.len(),
            missing = self.missing.len(),
            "Filtered instruments by watch-list"
        );
        if !self.missing.is_empty() {
            tracing::warn!(
                sample = ?self.missing.iter().take(10).collect::<Vec<_>>(),
                "Watch-list names not found in catalog"
            );
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
