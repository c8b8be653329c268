//! Kite Connect wire types

use crate::catalog::{Instrument, InstrumentKind};
use crate::provider::{ProviderError, ProviderResult, Quote};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Response envelope shared by the JSON endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct KiteEnvelope<T> {
    pub status: String,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

impl<T> KiteEnvelope<T> {
    pub fn into_data(self) -> ProviderResult<T> {
        if self.status != "success" {
            let message = self.message.unwrap_or_else(|| "unknown error".to_string());
            return Err(match self.error_type.as_deref() {
                Some("TokenException") | Some("PermissionException") => {
                    ProviderError::Unauthenticated(message)
                }
                _ => ProviderError::Malformed(format!("status {}: {}", self.status, message)),
            });
        }
        self.data
            .ok_or_else(|| ProviderError::Malformed("missing data".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct KiteOhlc {
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
}

/// Entry of `/quote`
#[derive(Debug, Deserialize)]
pub(crate) struct KiteQuote {
    #[serde(default)]
    pub last_price: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub ohlc: Option<KiteOhlc>,
}

impl From<KiteQuote> for Quote {
    fn from(q: KiteQuote) -> Self {
        let ohlc = q.ohlc.unwrap_or_default();
        Self {
            last_price: q.last_price,
            open: ohlc.open,
            high: ohlc.high,
            low: ohlc.low,
            close: ohlc.close,
            volume: q.volume,
        }
    }
}

/// Entry of `/quote/ltp`
#[derive(Debug, Deserialize)]
pub(crate) struct KiteLtp {
    #[serde(default)]
    pub last_price: Option<Decimal>,
}

/// Strip the `EXCHANGE:` prefix from every response key
pub(crate) fn strip_exchange<T>(data: HashMap<String, T>) -> HashMap<String, T> {
    data.into_iter()
        .map(|(key, value)| match key.split_once(':') {
            Some((_, symbol)) => (symbol.to_string(), value),
            None => (key, value),
        })
        .collect()
}

/// Row of the `/instruments/{segment}` CSV dump
#[derive(Debug, Deserialize)]
struct InstrumentRow {
    tradingsymbol: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    strike: String,
    instrument_type: String,
}

/// Parse the instruments CSV, keeping futures and options only
pub(crate) fn parse_instruments(body: &str) -> ProviderResult<Vec<Instrument>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut instruments = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<InstrumentRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                skipped += 1;
                tracing::debug!(error = %e, "Skipping malformed instrument row");
                continue;
            }
        };
        let Some(kind) = InstrumentKind::from_code(&row.instrument_type) else {
            continue;
        };
        let strike = Decimal::from_str(&row.strike).unwrap_or(Decimal::ZERO);
        let name = if row.name.is_empty() {
            row.tradingsymbol.clone()
        } else {
            row.name
        };
        instruments.push(Instrument::new(row.tradingsymbol, name, kind, strike));
    }

    if instruments.is_empty() && skipped > 0 {
        return Err(ProviderError::Malformed(format!(
            "no readable instrument rows ({skipped} malformed)"
        )));
    }
    Ok(instruments)
}
