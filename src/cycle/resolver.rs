//! Contract cycle resolution
//!
//! Cycle codes are a two-digit year followed by an upper-case three-letter
//! month, e.g. `25OCT`.

use crate::config::ContractsConfig;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// The monthly expiry group used for one fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCycle {
    pub code: String,
    /// Set when the next-month fallback replaced the primary cycle
    pub is_fallback: bool,
}

impl ContractCycle {
    pub fn primary(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            is_fallback: false,
        }
    }

    pub fn fallback(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            is_fallback: true,
        }
    }
}

/// Cycle code for the month containing `date`
pub fn current_month_code(date: NaiveDate) -> String {
    month_code(date.year(), date.month())
}

/// Cycle code for the calendar month after `date`, wrapping December into January
pub fn next_month_code(date: NaiveDate) -> String {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    month_code(year, month)
}

fn month_code(year: i32, month: u32) -> String {
    let idx = (month as usize).saturating_sub(1).min(11);
    format!("{:02}{}", year.rem_euclid(100), MONTHS[idx])
}

/// Resolves the active cycle code and its fallback
#[derive(Debug, Clone)]
pub struct ContractCycleResolver {
    month_override: Option<String>,
    fallback_next_month: bool,
}

impl ContractCycleResolver {
    pub fn new(config: &ContractsConfig) -> Self {
        Self {
            month_override: config.month_override().map(str::to_uppercase),
            fallback_next_month: config.fallback_next_month,
        }
    }

    /// Primary cycle for `today`; an override wins over the computed code
    pub fn resolve(&self, today: NaiveDate) -> ContractCycle {
        match &self.month_override {
            Some(code) => ContractCycle::primary(code.clone()),
            None => ContractCycle::primary(current_month_code(today)),
        }
    }

    /// Fallback cycle for `today`, if fallback applies
    ///
    /// Never offered when an override is configured or fallback is disabled.
    pub fn fallback(&self, today: NaiveDate) -> Option<ContractCycle> {
        if self.month_override.is_some() || !self.fallback_next_month {
            return None;
        }
        Some(ContractCycle::fallback(next_month_code(today)))
    }

    pub fn has_override(&self) -> bool {
        self.month_override.is_some()
    }
}
