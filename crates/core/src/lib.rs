//! Pulsefolio Core - portfolio valuation over live quotes.
//!
//! Holdings (ticker + quantity) come from the caller; this crate asks the
//! market-data crate for quotes and turns them into per-holding values and
//! portfolio totals.

pub mod errors;
pub mod portfolio;

pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
