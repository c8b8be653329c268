//! Instrument catalog module
//!
//! Raw instrument universe for one exchange segment, scoped by a watch-list

mod types;
mod universe;
mod watchlist;

pub use types::{Instrument, InstrumentKind, MarketFields};
pub use universe::InstrumentCatalog;
pub use watchlist::WatchList;
