//! Kite Connect REST client

use super::types::{parse_instruments, strip_exchange, KiteEnvelope, KiteLtp, KiteQuote};
use crate::catalog::Instrument;
use crate::config::{ContractsConfig, KiteConfig};
use crate::provider::{
    CatalogProvider, ProviderError, ProviderResult, Quote, QuoteProvider, SpotPriceProvider,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Most instruments accepted by one `/quote` request
pub const MAX_QUOTE_BATCH: usize = 500;
/// Most instruments accepted by one `/quote/ltp` request
pub const MAX_LTP_BATCH: usize = 1000;

/// API key and session access token
#[derive(Clone, PartialEq, Eq)]
pub struct KiteCredentials {
    pub api_key: String,
    pub access_token: String,
}

impl std::fmt::Debug for KiteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KiteCredentials")
            .field("api_key", &self.api_key)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl KiteCredentials {
    fn authorization(&self) -> String {
        format!("token {}:{}", self.api_key, self.access_token)
    }
}

/// Client for the Kite Connect REST API
///
/// Quote keys are plain tradingsymbols; the segment prefix is added on the way
/// out and stripped on the way back.
pub struct KiteClient {
    client: Client,
    base_url: String,
    segment: String,
    spot_exchange: String,
    credentials: RwLock<Option<KiteCredentials>>,
}

impl KiteClient {
    pub fn new(kite: &KiteConfig, contracts: &ContractsConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(kite.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: kite.base_url.trim_end_matches('/').to_string(),
            segment: contracts.segment.clone(),
            spot_exchange: contracts.spot_exchange.clone(),
            credentials: RwLock::new(None),
        })
    }

    /// Install the session used by every subsequent request
    pub async fn set_credentials(&self, credentials: KiteCredentials) {
        *self.credentials.write().await = Some(credentials);
    }

    pub async fn has_credentials(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    async fn authorization(&self) -> ProviderResult<String> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(KiteCredentials::authorization)
            .ok_or_else(|| ProviderError::Unauthenticated("no active session".to_string()))
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> ProviderResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, params = query.len(), "Kite request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("X-Kite-Version", "3")
            .header(reqwest::header::AUTHORIZATION, self.authorization().await?)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<KiteEnvelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or(body);
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthenticated(message),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
            _ => ProviderError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ProviderResult<T> {
        let envelope: KiteEnvelope<T> = self.get(path, query).await?.json().await?;
        envelope.into_data()
    }

    fn instrument_keys(&self, symbols: &[String]) -> Vec<String> {
        symbols
            .iter()
            .map(|s| format!("{}:{}", self.segment, s))
            .collect()
    }
}

fn query_pairs(keys: &[String]) -> Vec<(&str, &str)> {
    keys.iter().map(|k| ("i", k.as_str())).collect()
}

#[async_trait]
impl CatalogProvider for KiteClient {
    async fn fetch_instruments(&self, segment: &str) -> ProviderResult<Vec<Instrument>> {
        let body = self
            .get(&format!("/instruments/{segment}"), &[])
            .await?
            .text()
            .await?;
        let instruments = parse_instruments(&body)?;
        tracing::debug!(segment, instruments = instruments.len(), "Parsed instrument dump");
        Ok(instruments)
    }
}

#[async_trait]
impl QuoteProvider for KiteClient {
    fn max_batch_size(&self) -> usize {
        MAX_QUOTE_BATCH
    }

    fn max_ltp_batch_size(&self) -> usize {
        MAX_LTP_BATCH
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> ProviderResult<HashMap<String, Quote>> {
        let keys = self.instrument_keys(symbols);
        let data: HashMap<String, KiteQuote> = self.get_json("/quote", &query_pairs(&keys)).await?;
        Ok(strip_exchange(data)
            .into_iter()
            .map(|(symbol, quote)| (symbol, Quote::from(quote)))
            .collect())
    }

    async fn fetch_last_prices(&self, symbols: &[String]) -> ProviderResult<HashMap<String, Decimal>> {
        let keys = self.instrument_keys(symbols);
        let data: HashMap<String, KiteLtp> = self.get_json("/quote/ltp", &query_pairs(&keys)).await?;
        Ok(strip_exchange(data)
            .into_iter()
            .filter_map(|(symbol, ltp)| ltp.last_price.map(|p| (symbol, p)))
            .collect())
    }
}

#[async_trait]
impl SpotPriceProvider for KiteClient {
    async fn fetch_spot(&self, underlying: &str) -> ProviderResult<Option<Decimal>> {
        let key = format!("{}:{}", self.spot_exchange, underlying);
        let data: HashMap<String, KiteQuote> = self.get_json("/quote", &[("i", key.as_str())]).await?;
        Ok(data
            .into_values()
            .next()
            .and_then(|q| q.last_price)
            .filter(|p| *p > Decimal::ZERO))
    }
}
