//! Pulsefolio Market Data Crate
//!
//! Live quote retrieval for portfolio valuation: a short-lived per-ticker
//! cache in front of a slow, rate-limited upstream API, with bounded parallel
//! fetching and partial-failure tolerance.
//!
//! # Architecture
//!
//! ```text
//! +--------------------+
//! |  BatchQuoteService |  (dedup, partition, merge)
//! +--------------------+
//!      |           |
//!      v           v
//! +----------+  +---------------+
//! |QuoteCache|  | QuoteFetcher  |  (one upstream call per ticker)
//! +----------+  +---------------+
//!                      |
//!                      v
//!              +---------------+
//!              | FetchOutcome  |  (Found | NoData | Failed)
//!              +---------------+
//! ```
//!
//! # Core Types
//!
//! - [`Quote`] - Canonical quote snapshot
//! - [`QuoteCache`] - TTL cache with lazy staleness
//! - [`QuoteFetcher`] - Upstream source abstraction
//! - [`FinnhubQuoteFetcher`] - Finnhub implementation
//! - [`BatchQuoteService`] - Batch orchestration
//! - [`MarketDataConfig`] - Cache TTL, concurrency and timeout knobs

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod service;

pub use cache::{CachedQuote, QuoteCache};
pub use config::MarketDataConfig;
pub use errors::{FailureKind, MarketDataError};
pub use models::{normalize_ticker, NewsArticle, Quote};
pub use provider::finnhub::FinnhubQuoteFetcher;
pub use provider::{FetchOutcome, QuoteFetcher};
pub use service::{
    BatchQuoteService, BatchReport, QuoteBatch, QuoteMap, QuoteServiceTrait, RateLimiter,
};
