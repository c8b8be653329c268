//! Provider module
//!
//! Narrow seams to the external collaborators: instrument catalog, quotes,
//! spot prices, session management and notification delivery.

mod batch;
mod types;

pub use batch::{fetch_last_prices_batched, fetch_quotes_batched, BatchOutcome};
pub use types::{ProviderError, ProviderResult, Quote};

use crate::catalog::Instrument;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;

/// Source of the raw instrument universe
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch every instrument listed on `segment`
    async fn fetch_instruments(&self, segment: &str) -> ProviderResult<Vec<Instrument>>;
}

/// Source of live quotes, keyed by trading symbol
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Maximum symbols accepted by one `fetch_quotes` call
    fn max_batch_size(&self) -> usize;

    /// Maximum symbols accepted by one `fetch_last_prices` call
    fn max_ltp_batch_size(&self) -> usize {
        self.max_batch_size()
    }

    /// Fetch full quotes for one batch
    async fn fetch_quotes(&self, symbols: &[String]) -> ProviderResult<HashMap<String, Quote>>;

    /// Fetch last traded prices for one batch
    async fn fetch_last_prices(&self, symbols: &[String]) -> ProviderResult<HashMap<String, Decimal>> {
        let quotes = self.fetch_quotes(symbols).await?;
        Ok(quotes
            .into_iter()
            .filter_map(|(symbol, quote)| quote.last_price.map(|p| (symbol, p)))
            .collect())
    }
}

/// Source of underlying spot prices
#[async_trait]
pub trait SpotPriceProvider: Send + Sync {
    /// Spot price of `underlying` on its primary exchange, if quoted
    async fn fetch_spot(&self, underlying: &str) -> ProviderResult<Option<Decimal>>;
}

/// Session management for authenticated providers
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Make sure a usable session exists
    async fn ensure_session(&self) -> ProviderResult<()>;
}

/// Alert delivery; best-effort, never fails the caller
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, title: &str, message: &str, duration: Duration);
}
