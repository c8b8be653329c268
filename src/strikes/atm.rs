//! ATM reference price resolution

use crate::catalog::Instrument;
use crate::provider::SpotPriceProvider;
use rust_decimal::Decimal;
use serde::Serialize;

/// Where the ATM reference price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AtmSource {
    Spot,
    Future,
    /// Degraded: price of an option on the same underlying
    Option,
}

/// Resolve the ATM price for `underlying`
///
/// Sources in order: live spot quote, the cycle future's last price, any cycle
/// option's last price. The first positive value wins; provider errors fall
/// through to the next source.
pub async fn resolve_atm_price(
    spot: &dyn SpotPriceProvider,
    underlying: &str,
    futures: &[&Instrument],
    options: &[&Instrument],
) -> Option<(Decimal, AtmSource)> {
    match spot.fetch_spot(underlying).await {
        Ok(Some(price)) if price > Decimal::ZERO => return Some((price, AtmSource::Spot)),
        Ok(_) => {}
        Err(e) => tracing::debug!(underlying, error = %e, "Spot quote unavailable"),
    }

    if let Some(price) = first_positive_price(futures) {
        return Some((price, AtmSource::Future));
    }

    first_positive_price(options).map(|price| (price, AtmSource::Option))
}

fn first_positive_price(contracts: &[&Instrument]) -> Option<Decimal> {
    contracts
        .iter()
        .map(|c| c.market.last_price)
        .find(|price| *price > Decimal::ZERO)
}
