//! In-memory collaborators shared by the integration tests

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use nfo_watch::catalog::{Instrument, InstrumentKind};
use nfo_watch::config::Config;
use nfo_watch::provider::{
    CatalogProvider, NotificationSink, ProviderError, ProviderResult, Quote, QuoteProvider,
    SessionProvider, SpotPriceProvider,
};
use nfo_watch::scheduler::{Collaborators, Pipeline};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, 10, 15, 0).unwrap()
}

pub fn future(symbol: &str, name: &str) -> Instrument {
    Instrument::new(symbol, name, InstrumentKind::Future, Decimal::ZERO)
}

/// Call and put at every strike of `{name}{cycle}{strike}CE|PE`
pub fn chain(name: &str, cycle: &str, strikes: &[i64]) -> Vec<Instrument> {
    strikes
        .iter()
        .flat_map(|k| {
            let strike = Decimal::from(*k);
            [
                Instrument::new(format!("{name}{cycle}{k}CE"), name, InstrumentKind::Call, strike),
                Instrument::new(format!("{name}{cycle}{k}PE"), name, InstrumentKind::Put, strike),
            ]
        })
        .collect()
}

pub fn quote(open: Decimal, last: Decimal) -> Quote {
    Quote {
        last_price: Some(last),
        open: Some(open),
        high: Some(last),
        low: Some(open),
        close: Some(open),
        volume: Some(100),
    }
}

/// Config writing into `dir` with no watch-list
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.output_dir = dir.to_path_buf();
    config.contracts.watchlist_path = dir.join("missing_watchlist.txt");
    config.scan.max_strikes = 1;
    config.scheduler.interval_seconds = 60;
    config
}

#[derive(Default)]
pub struct FakeSession {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
    /// Cancelled once `calls` reaches the paired limit
    pub cancel_after: Option<(usize, CancellationToken)>,
}

#[async_trait]
impl SessionProvider for FakeSession {
    async fn ensure_session(&self) -> ProviderResult<()> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((limit, token)) = &self.cancel_after {
            if calls >= *limit {
                token.cancel();
            }
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Unauthenticated("token expired".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub instruments: Mutex<Vec<Instrument>>,
    pub fail: AtomicBool,
}

impl FakeCatalog {
    pub fn with(instruments: Vec<Instrument>) -> Self {
        Self {
            instruments: Mutex::new(instruments),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn fetch_instruments(&self, _segment: &str) -> ProviderResult<Vec<Instrument>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Timeout);
        }
        Ok(self.instruments.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeQuotes {
    pub quotes: Mutex<HashMap<String, Quote>>,
    /// Symbol sets requested, in order
    pub requests: Mutex<Vec<Vec<String>>>,
}

impl FakeQuotes {
    pub fn with(quotes: HashMap<String, Quote>) -> Self {
        Self {
            quotes: Mutex::new(quotes),
            requests: Mutex::default(),
        }
    }

    pub fn set(&self, symbol: &str, quote: Quote) {
        self.quotes.lock().unwrap().insert(symbol.to_string(), quote);
    }
}

#[async_trait]
impl QuoteProvider for FakeQuotes {
    fn max_batch_size(&self) -> usize {
        500
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> ProviderResult<HashMap<String, Quote>> {
        self.requests.lock().unwrap().push(symbols.to_vec());
        let quotes = self.quotes.lock().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| quotes.get(s).map(|q| (s.clone(), q.clone())))
            .collect())
    }
}

#[derive(Default)]
pub struct FakeSpot {
    pub prices: HashMap<String, Decimal>,
}

#[async_trait]
impl SpotPriceProvider for FakeSpot {
    async fn fetch_spot(&self, underlying: &str) -> ProviderResult<Option<Decimal>> {
        Ok(self.prices.get(underlying).copied())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, Duration)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String, Duration)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str, duration: Duration) {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string(), duration));
    }
}

/// Handles to every fake behind a pipeline
pub struct Harness {
    pub session: Arc<FakeSession>,
    pub catalog: Arc<FakeCatalog>,
    pub quotes: Arc<FakeQuotes>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(session: FakeSession, catalog: FakeCatalog, quotes: FakeQuotes) -> Self {
        Self {
            session: Arc::new(session),
            catalog: Arc::new(catalog),
            quotes: Arc::new(quotes),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn pipeline(&self, config: Config, spot: FakeSpot) -> Pipeline {
        let services = Collaborators {
            session: self.session.clone(),
            catalog: self.catalog.clone(),
            quotes: self.quotes.clone(),
            spot: Arc::new(spot),
            notifier: self.notifier.clone(),
        };
        Pipeline::new(config, services)
    }
}
