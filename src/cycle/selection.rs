//! Cycle-scoped contract selection with next-month fallback

use super::{ContractCycle, ContractCycleResolver};
use crate::catalog::{Instrument, WatchList};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use thiserror::Error;

/// Cycle resolution failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CycleError {
    /// Neither the primary nor the fallback cycle has futures
    #[error("No futures for cycle {primary} or fallback {fallback}")]
    NoFutures { primary: String, fallback: String },
    /// The active cycle has no contracts at all
    #[error("No contracts found for cycle {0}")]
    NoContracts(String),
}

/// Futures and options of one active cycle
///
/// Contracts always come from a single cycle; primary and fallback are never mixed.
#[derive(Debug, Clone)]
pub struct ContractSet {
    pub cycle: ContractCycle,
    pub futures: Vec<Instrument>,
    pub options: Vec<Instrument>,
}

impl ContractSet {
    /// Partition `universe` into the futures and options of `cycle`
    pub fn collect(universe: &[Instrument], cycle: ContractCycle) -> Self {
        let mut futures = Vec::new();
        let mut options = Vec::new();
        for instrument in universe.iter().filter(|i| i.in_cycle(&cycle.code)) {
            if instrument.is_future() {
                futures.push(instrument.clone());
            } else if instrument.is_option() {
                options.push(instrument.clone());
            }
        }
        Self {
            cycle,
            futures,
            options,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.futures.is_empty() && self.options.is_empty()
    }

    /// Futures followed by options
    pub fn all_contracts(&self) -> impl Iterator<Item = &Instrument> {
        self.futures.iter().chain(self.options.iter())
    }

    /// Coverage of the watch-list by this set
    pub fn coverage(&self, watchlist: &WatchList) -> CoverageReport {
        let with_futures: BTreeSet<String> = self.futures.iter().map(Instrument::underlying).collect();
        let with_options: BTreeSet<String> = self.options.iter().map(Instrument::underlying).collect();
        let with_any: BTreeSet<&str> = with_futures
            .union(&with_options)
            .map(String::as_str)
            .collect();
        let missing = watchlist
            .names()
            .filter(|name| !with_any.contains(name))
            .map(str::to_string)
            .collect();

        CoverageReport {
            with_futures: with_futures.len(),
            with_options: with_options.len(),
            with_any: with_any.len(),
            missing,
        }
    }
}

/// Which watch-list names have contracts in the active cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    pub with_futures: usize,
    pub with_options: usize,
    pub with_any: usize,
    /// Watch-list names with no contract in the cycle
    pub missing: Vec<String>,
}

/// Select the active cycle's contracts from `universe`
///
/// Falls back to the next calendar month only when the primary cycle has zero
/// futures. Zero options alone never triggers the fallback.
pub fn select_contracts(
    universe: &[Instrument],
    resolver: &ContractCycleResolver,
    today: NaiveDate,
) -> Result<ContractSet, CycleError> {
    let primary = resolver.resolve(today);
    let set = ContractSet::collect(universe, primary);
    tracing::info!(
        cycle = %set.cycle.code,
        futures = set.futures.len(),
        options = set.options.len(),
        "Filtered current cycle contracts"
    );

    if !set.futures.is_empty() {
        return Ok(set);
    }

    match resolver.fallback(today) {
        Some(fallback) => {
            tracing::warn!(
                primary = %set.cycle.code,
                fallback = %fallback.code,
                "No futures in current cycle, trying next month"
            );
            let fallback_set = ContractSet::collect(universe, fallback);
            if fallback_set.futures.is_empty() {
                return Err(CycleError::NoFutures {
                    primary: set.cycle.code,
                    fallback: fallback_set.cycle.code,
                });
            }
            tracing::info!(
                cycle = %fallback_set.cycle.code,
                futures = fallback_set.futures.len(),
                options = fallback_set.options.len(),
                "Fallback cycle selected"
            );
            Ok(fallback_set)
        }
        None if set.is_empty() => Err(CycleError::NoContracts(set.cycle.code)),
        None => Ok(set),
    }
}
