//! Momentum scanner
//!
//! Measures each option's gain against the session open and keeps those at or
//! above the threshold.

use super::types::{MomentumRecord, MomentumScan};
use crate::catalog::Instrument;
use crate::config::ScanConfig;
use crate::provider::{fetch_quotes_batched, Quote, QuoteProvider};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Percentage change from `open` to `current`
///
/// `None` unless both prices are strictly positive and the change fits in a
/// `Decimal`.
pub fn percent_change(open: Decimal, current: Decimal) -> Option<Decimal> {
    if open <= Decimal::ZERO || current <= Decimal::ZERO {
        return None;
    }
    current
        .checked_sub(open)?
        .checked_div(open)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Scan `contracts` against `quotes`
///
/// Contracts without a quote, open or last price are skipped. The threshold is
/// inclusive. Records are sorted by descending gain; ties keep input order.
pub fn scan<'a>(
    contracts: &'a [Instrument],
    quotes: &HashMap<String, Quote>,
    threshold_percent: Decimal,
) -> Vec<MomentumRecord<'a>> {
    let mut records: Vec<MomentumRecord<'a>> = contracts
        .iter()
        .filter_map(|instrument| {
            let quote = quotes.get(&instrument.tradingsymbol)?;
            let open_price = quote.open?;
            let current_price = quote.last_price?;
            let percent_change = percent_change(open_price, current_price)?;
            (percent_change >= threshold_percent).then(|| MomentumRecord {
                instrument,
                open_price,
                current_price,
                percent_change,
                volume: quote.volume.unwrap_or_default(),
            })
        })
        .collect();

    records.sort_by(|a, b| b.percent_change.cmp(&a.percent_change));
    records
}

/// Batched quote fetch followed by [`scan`]
#[derive(Debug, Clone)]
pub struct MomentumScanner {
    threshold_percent: Decimal,
    batch_size: usize,
}

impl MomentumScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            threshold_percent: config.threshold_percent,
            batch_size: config.quote_batch_size,
        }
    }

    pub fn threshold_percent(&self) -> Decimal {
        self.threshold_percent
    }

    /// Quote `contracts` in batches and keep the movers
    ///
    /// Failed batches only shrink the result.
    pub async fn run<'a>(
        &self,
        provider: &dyn QuoteProvider,
        contracts: &'a [Instrument],
    ) -> MomentumScan<'a> {
        if contracts.is_empty() {
            tracing::warn!("No options to scan");
            return MomentumScan::default();
        }

        let symbols: Vec<String> = contracts.iter().map(|c| c.tradingsymbol.clone()).collect();
        let quotes = fetch_quotes_batched(provider, &symbols, self.batch_size).await;
        let records = scan(contracts, &quotes.values, self.threshold_percent);

        tracing::info!(
            scanned = contracts.len(),
            quoted = quotes.values.len(),
            qualifying = records.len(),
            threshold = %self.threshold_percent,
            failed_batches = quotes.failed_batches,
            "Momentum scan complete"
        );

        MomentumScan {
            records,
            quoted: quotes.values.len(),
            failed_batches: quotes.failed_batches,
        }
    }
}
