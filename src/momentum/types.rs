//! Momentum types

use crate::catalog::Instrument;
use rust_decimal::Decimal;

/// One contract that moved at least the threshold since the session open
///
/// Created fresh each scan and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumRecord<'a> {
    pub instrument: &'a Instrument,
    pub open_price: Decimal,
    pub current_price: Decimal,
    /// Percentage gain from `open_price` to `current_price`
    pub percent_change: Decimal,
    pub volume: u64,
}

impl MomentumRecord<'_> {
    /// Upper-case underlying name, falling back to the tradingsymbol
    pub fn snapshot_name(&self) -> String {
        let name = self.instrument.underlying();
        if name.is_empty() {
            self.instrument.tradingsymbol.trim().to_uppercase()
        } else {
            name
        }
    }
}

/// Result of a batched momentum scan
#[derive(Debug, Clone, Default)]
pub struct MomentumScan<'a> {
    /// Qualifying records, highest gain first
    pub records: Vec<MomentumRecord<'a>>,
    /// Contracts for which a quote was received
    pub quoted: usize,
    pub failed_batches: usize,
}
