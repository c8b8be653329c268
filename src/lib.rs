//! nfo-watch: momentum watcher for NFO option contracts
//!
//! This library provides the core components for:
//! - Instrument universe refresh scoped by a watch-list
//! - Contract cycle resolution with next-month fallback
//! - ATM/OTM strike window selection per underlying
//! - Momentum scanning against the session open
//! - Snapshot diffing, alerting and persistence
//! - A fixed-interval polling scheduler with cooperative cancellation
//! - Kite Connect REST adapter for the provider seams

pub mod catalog;
pub mod cli;
pub mod config;
pub mod cycle;
pub mod kite;
pub mod momentum;
pub mod notify;
pub mod provider;
pub mod quotes;
pub mod scheduler;
pub mod snapshot;
pub mod strikes;
pub mod telemetry;
