//! Provider types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by external collaborators
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),
    /// Request exceeded its deadline
    #[error("Request timed out")]
    Timeout,
    /// Provider refused the request due to rate limits
    #[error("Rate limited by provider")]
    RateLimited,
    /// Provider answered with an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    /// Response could not be decoded
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// No valid session
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),
}

impl ProviderError {
    /// Whether retrying later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout | Self::RateLimited)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            match status.as_u16() {
                401 | 403 => Self::Unauthenticated(e.to_string()),
                429 => Self::RateLimited,
                code => Self::Api {
                    status: code,
                    message: e.to_string(),
                },
            }
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Result alias for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Live quote for one symbol
///
/// Fields the provider did not send stay `None`; consumers decide how to
/// treat absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub last_price: Option<Decimal>,
    /// Session open
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    /// Previous session close
    pub close: Option<Decimal>,
    pub volume: Option<u64>,
}
