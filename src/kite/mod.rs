//! Kite Connect adapter
//!
//! Implements the catalog, quote and spot price seams over the Kite REST API.
//! Sessions come from environment variables; the OAuth login flow is handled
//! elsewhere.

mod client;
mod session;
mod types;

pub use client::{KiteClient, KiteCredentials, MAX_LTP_BATCH, MAX_QUOTE_BATCH};
pub use session::EnvSession;
