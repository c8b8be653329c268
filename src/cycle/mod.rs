//! Contract cycle module
//!
//! Resolves the active monthly cycle and narrows the universe to it, falling
//! back to the next month when the current one has no futures.

mod resolver;
mod selection;

pub use resolver::{current_month_code, next_month_code, ContractCycle, ContractCycleResolver};
pub use selection::{select_contracts, ContractSet, CoverageReport, CycleError};
