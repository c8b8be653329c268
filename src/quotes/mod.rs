//! Display enrichment of contract market fields
//!
//! Overwrites the market fields of every selected contract from the latest
//! quotes. Missing values are zero-filled here, unlike the momentum scan which
//! drops contracts without a usable open and last price.

use crate::catalog::{Instrument, MarketFields};
use crate::config::ScanConfig;
use crate::provider::{fetch_last_prices_batched, fetch_quotes_batched, Quote, QuoteProvider};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Batch accounting for one enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub contracts: usize,
    pub last_prices: usize,
    pub quotes: usize,
    pub failed_batches: usize,
}

/// Market fields for one contract from its LTP and full quote
///
/// The LTP endpoint wins for the last price. Change is measured against the
/// previous close, rounded to two places, and zero when there is no close or the change overflows.
pub fn market_fields(last_price: Option<Decimal>, quote: Option<&Quote>) -> MarketFields {
    let quote = quote.cloned().unwrap_or_default();
    let last_price = last_price
        .or(quote.last_price)
        .unwrap_or(Decimal::ZERO);
    let close = quote.close.unwrap_or(Decimal::ZERO);
    let change_percent = if close > Decimal::ZERO {
        last_price
            .checked_sub(close)
            .and_then(|d| d.checked_div(close))
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .map(|c| c.round_dp(2))
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    MarketFields {
        last_price,
        open: quote.open.unwrap_or(Decimal::ZERO),
        high: quote.high.unwrap_or(Decimal::ZERO),
        low: quote.low.unwrap_or(Decimal::ZERO),
        close,
        volume: quote.volume.unwrap_or(0),
        change_percent,
    }
}

/// Overwrite the market fields of `contracts` from already fetched quotes
pub fn enrich_contracts(
    contracts: &mut [Instrument],
    last_prices: &HashMap<String, Decimal>,
    quotes: &HashMap<String, Quote>,
) {
    for contract in contracts.iter_mut() {
        let symbol = contract.tradingsymbol.as_str();
        contract.market = market_fields(last_prices.get(symbol).copied(), quotes.get(symbol));
    }
}

/// Fetch LTPs and full quotes in batches, then enrich `contracts`
///
/// Failed batches leave the affected contracts zero-filled.
pub async fn enrich_from_provider(
    provider: &dyn QuoteProvider,
    contracts: &mut [Instrument],
    config: &ScanConfig,
) -> EnrichmentReport {
    if contracts.is_empty() {
        return EnrichmentReport::default();
    }

    let symbols: Vec<String> = contracts.iter().map(|c| c.tradingsymbol.clone()).collect();
    let last_prices = fetch_last_prices_batched(provider, &symbols, config.ltp_batch_size).await;
    let quotes = fetch_quotes_batched(provider, &symbols, config.full_quote_batch_size).await;

    enrich_contracts(contracts, &last_prices.values, &quotes.values);

    let report = EnrichmentReport {
        contracts: contracts.len(),
        last_prices: last_prices.values.len(),
        quotes: quotes.values.len(),
        failed_batches: last_prices.failed_batches + quotes.failed_batches,
    };
    tracing::debug!(
        contracts = report.contracts,
        last_prices = report.last_prices,
        quotes = report.quotes,
        failed_batches = report.failed_batches,
        "Enriched contract market data"
    );
    report
}
