//! Strike windowing around the ATM price

use super::atm::AtmSource;
use crate::catalog::Instrument;
use rust_decimal::Decimal;
use serde::Serialize;
use std::ops::Range;

/// Selected strikes for one underlying
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrikeWindow {
    pub underlying: String,
    pub atm_price: Decimal,
    pub atm_source: AtmSource,
    /// Strike nearest to `atm_price`
    pub atm_strike: Decimal,
    /// Contiguous, ascending slice of the distinct strikes
    pub strikes: Vec<Decimal>,
}

/// Sorted distinct strikes of `options`
pub fn distinct_strikes<'a>(options: impl IntoIterator<Item = &'a Instrument>) -> Vec<Decimal> {
    let mut strikes: Vec<Decimal> = options.into_iter().map(|o| o.strike).collect();
    strikes.sort();
    strikes.dedup();
    strikes
}

/// Index of the strike closest to `price`
///
/// Running minimum: on equal distance the earlier (lower) strike is kept.
/// Returns `None` for an empty sequence.
pub fn nearest_strike_index(strikes: &[Decimal], price: Decimal) -> Option<usize> {
    let mut best: Option<(usize, Decimal)> = None;
    for (index, strike) in strikes.iter().enumerate() {
        let distance = (*strike - price).abs();
        match best {
            Some((_, min)) if distance >= min => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

/// Index range `[max(0, atm - n), min(len, atm + n + 1))`
pub fn window_range(len: usize, atm_index: usize, window_size: usize) -> Range<usize> {
    let start = atm_index.saturating_sub(window_size);
    let end = atm_index.saturating_add(window_size).saturating_add(1).min(len);
    start..end.max(start)
}

/// Select the options of one underlying whose strike lies in the ATM window
///
/// Both legs at every selected strike are returned, in input order. An empty
/// `options` slice yields no window.
pub fn select_window<'a>(
    underlying: &str,
    options: &[&'a Instrument],
    atm_price: Decimal,
    atm_source: AtmSource,
    window_size: usize,
) -> Option<(StrikeWindow, Vec<&'a Instrument>)> {
    let strikes = distinct_strikes(options.iter().copied());
    let atm_index = nearest_strike_index(&strikes, atm_price)?;
    let range = window_range(strikes.len(), atm_index, window_size);
    let selected = &strikes[range];

    let chosen = options
        .iter()
        .copied()
        .filter(|o| selected.binary_search(&o.strike).is_ok())
        .collect();

    let window = StrikeWindow {
        underlying: underlying.to_string(),
        atm_price,
        atm_source,
        atm_strike: strikes[atm_index],
        strikes: selected.to_vec(),
    };
    Some((window, chosen))
}
