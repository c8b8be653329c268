//! Instrument types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of derivative contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// Futures contract (strike is zero)
    Future,
    /// Call option
    Call,
    /// Put option
    Put,
}

impl InstrumentKind {
    /// Map an exchange instrument type code (`FUT`, `CE`, `PE`)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "FUT" => Some(Self::Future),
            "CE" => Some(Self::Call),
            "PE" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn is_option(&self) -> bool {
        matches!(self, Self::Call | Self::Put)
    }
}

/// Market fields overwritten on every enrichment pass
///
/// Missing values are zero here; this is the display path only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketFields {
    pub last_price: Decimal,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    /// Previous session close
    pub close: Decimal,
    pub volume: u64,
    /// Change versus previous close, rounded to two places
    pub change_percent: Decimal,
}

/// A single exchange instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Exchange trading symbol (e.g. "RELIANCE25OCT2800CE")
    pub tradingsymbol: String,
    /// Underlying name (e.g. "RELIANCE")
    pub name: String,
    pub kind: InstrumentKind,
    /// Strike price; zero for futures
    pub strike: Decimal,
    /// Monthly cycle tag parsed from the trading symbol, when present
    pub cycle_tag: Option<String>,
    #[serde(default)]
    pub market: MarketFields,
}

impl Instrument {
    /// Build an instrument, deriving the cycle tag from the trading symbol
    pub fn new(
        tradingsymbol: impl Into<String>,
        name: impl Into<String>,
        kind: InstrumentKind,
        strike: Decimal,
    ) -> Self {
        let tradingsymbol = tradingsymbol.into();
        let name = name.into();
        let cycle_tag = parse_cycle_tag(&tradingsymbol, &name);
        Self {
            tradingsymbol,
            name,
            kind,
            strike,
            cycle_tag,
            market: MarketFields::default(),
        }
    }

    /// Upper-cased underlying name
    pub fn underlying(&self) -> String {
        self.name.trim().to_uppercase()
    }

    /// Whether this contract belongs to the given cycle code
    ///
    /// Monthly symbols compare their parsed tag. Symbols without one (weeklies)
    /// fall back to a substring match on the trading symbol.
    pub fn in_cycle(&self, code: &str) -> bool {
        if code.is_empty() {
            return false;
        }
        match &self.cycle_tag {
            Some(tag) => tag == code,
            None => self.tradingsymbol.contains(code),
        }
    }

    pub fn is_future(&self) -> bool {
        self.kind == InstrumentKind::Future
    }

    pub fn is_option(&self) -> bool {
        self.kind.is_option()
    }
}

/// Extract a `yyMMM` cycle tag that immediately follows the underlying name
fn parse_cycle_tag(tradingsymbol: &str, name: &str) -> Option<String> {
    let rest = tradingsymbol.strip_prefix(name.trim()).unwrap_or(tradingsymbol);
    let tag = rest.get(..5)?;
    let bytes = tag.as_bytes();
    let is_tag = bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[2..].iter().all(u8::is_ascii_uppercase);
    is_tag.then(|| tag.to_string())
}
