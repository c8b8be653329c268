//! Batched quote retrieval
//!
//! Batches only respect provider request-size limits. They run one after the
//! other; a failed batch is logged and skipped.

use super::{ProviderResult, Quote, QuoteProvider};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::future::Future;

/// Merged result of a batched fetch
#[derive(Debug, Clone)]
pub struct BatchOutcome<T> {
    pub values: HashMap<String, T>,
    pub total_batches: usize,
    pub failed_batches: usize,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            total_batches: 0,
            failed_batches: 0,
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn is_partial(&self) -> bool {
        self.failed_batches > 0
    }
}

/// Fetch full quotes, capping `batch_size` at the provider limit
pub async fn fetch_quotes_batched(
    provider: &dyn QuoteProvider,
    symbols: &[String],
    batch_size: usize,
) -> BatchOutcome<Quote> {
    let size = effective_batch_size(batch_size, provider.max_batch_size());
    fetch_batched(symbols, size, "quote", |batch| async move {
        provider.fetch_quotes(&batch).await
    })
    .await
}

/// Fetch last traded prices, capping `batch_size` at the provider limit
pub async fn fetch_last_prices_batched(
    provider: &dyn QuoteProvider,
    symbols: &[String],
    batch_size: usize,
) -> BatchOutcome<Decimal> {
    let size = effective_batch_size(batch_size, provider.max_ltp_batch_size());
    fetch_batched(symbols, size, "ltp", |batch| async move {
        provider.fetch_last_prices(&batch).await
    })
    .await
}

fn effective_batch_size(requested: usize, limit: usize) -> usize {
    requested.min(limit).max(1)
}

async fn fetch_batched<T, F, Fut>(
    symbols: &[String],
    batch_size: usize,
    label: &str,
    mut fetch: F,
) -> BatchOutcome<T>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = ProviderResult<HashMap<String, T>>>,
{
    let mut outcome = BatchOutcome::default();

    for (index, chunk) in symbols.chunks(batch_size.max(1)).enumerate() {
        outcome.total_batches += 1;
        match fetch(chunk.to_vec()).await {
            Ok(values) => {
                tracing::debug!(kind = label, batch = index + 1, received = values.len(), "Fetched batch");
                outcome.values.extend(values);
            }
            Err(e) => {
                outcome.failed_batches += 1;
                tracing::warn!(
                    kind = label,
                    batch = index + 1,
                    size = chunk.len(),
                    transient = e.is_transient(),
                    error = %e,
                    "Batch failed, skipping"
                );
            }
        }
    }

    tracing::info!(
        kind = label,
        received = outcome.values.len(),
        batches = outcome.total_batches,
        failed = outcome.failed_batches,
        "Batched fetch finished"
    );

    outcome
}
