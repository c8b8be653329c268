//! Strike window filter
//!
//! Narrows each underlying's options to the ATM strike plus `max_strikes` on
//! either side. Underlyings whose ATM price cannot be determined keep all of
//! their options.

mod atm;
mod window;

pub use atm::{resolve_atm_price, AtmSource};
pub use window::{distinct_strikes, nearest_strike_index, select_window, window_range, StrikeWindow};

use crate::catalog::Instrument;
use crate::cycle::ContractSet;
use crate::provider::SpotPriceProvider;
use std::collections::HashMap;

/// Per-underlying accounting for one filter pass
#[derive(Debug, Clone, Default)]
pub struct StrikeWindowReport {
    /// Underlyings with at least one option
    pub processed: usize,
    /// Underlyings kept unfiltered because no ATM price was found
    pub skipped: usize,
    pub windows: Vec<StrikeWindow>,
}

/// Filtered options plus the report that produced them
#[derive(Debug, Clone, Default)]
pub struct StrikeSelection {
    pub options: Vec<Instrument>,
    pub report: StrikeWindowReport,
}

/// Apply the ATM/OTM window to every underlying in `contracts`
///
/// Futures pass through untouched; only options are filtered. Underlyings are
/// visited in the order their first option appears.
pub async fn filter_atm_otm(
    contracts: &ContractSet,
    spot: &dyn SpotPriceProvider,
    window_size: usize,
) -> StrikeSelection {
    let mut futures_by_name: HashMap<String, Vec<&Instrument>> = HashMap::new();
    for future in &contracts.futures {
        futures_by_name.entry(future.underlying()).or_default().push(future);
    }

    let mut order: Vec<String> = Vec::new();
    let mut options_by_name: HashMap<String, Vec<&Instrument>> = HashMap::new();
    for option in &contracts.options {
        let name = option.underlying();
        let group = options_by_name.entry(name.clone()).or_default();
        if group.is_empty() {
            order.push(name);
        }
        group.push(option);
    }

    let mut selection = StrikeSelection::default();
    for name in &order {
        let Some(options) = options_by_name.get(name) else {
            continue;
        };
        selection.report.processed += 1;
        let futures = futures_by_name.get(name).map(Vec::as_slice).unwrap_or_default();

        let chosen = match resolve_atm_price(spot, name, futures, options).await {
            Some((price, source)) => select_window(name, options, price, source, window_size),
            None => None,
        };

        match chosen {
            Some((window, chosen)) => {
                tracing::debug!(
                    underlying = %name,
                    atm_price = %window.atm_price,
                    atm_strike = %window.atm_strike,
                    source = ?window.atm_source,
                    kept = chosen.len(),
                    of = options.len(),
                    "Selected strike window"
                );
                selection.options.extend(chosen.into_iter().cloned());
                selection.report.windows.push(window);
            }
            None => {
                tracing::warn!(underlying = %name, options = options.len(), "ATM price not found, keeping all options");
                selection.report.skipped += 1;
                selection.options.extend(options.iter().map(|o| (*o).clone()));
            }
        }
    }

    tracing::info!(
        cycle = %contracts.cycle.code,
        underlyings = selection.report.processed,
        skipped = selection.report.skipped,
        options_before = contracts.options.len(),
        options_after = selection.options.len(),
        "Applied ATM/OTM strike filter"
    );

    selection
}
