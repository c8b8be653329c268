//! Momentum scanning module
//!
//! Finds option contracts that have gained at least the configured percentage
//! since the session open.

mod scanner;
mod types;

pub use scanner::{percent_change, scan, MomentumScanner};
pub use types::{MomentumRecord, MomentumScan};
