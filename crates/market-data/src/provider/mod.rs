//! Upstream quote sources.
//!
//! This module contains:
//! - The `QuoteFetcher` trait that all sources implement
//! - `FetchOutcome`, the typed per-ticker result
//! - The Finnhub implementation

mod outcome;
mod traits;

pub mod finnhub;

pub use outcome::FetchOutcome;
pub use traits::QuoteFetcher;
