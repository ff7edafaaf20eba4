//! Batch quote retrieval.
//!
//! ```text
//! caller → BatchQuoteService → QuoteCache (fresh hits)
//!                  |
//!                  v  misses + stale, bounded concurrency
//!            QuoteFetcher → QuoteCache.put (on success)
//! ```

mod batch;
mod rate_limiter;
mod report;

#[cfg(test)]
mod batch_tests;

use std::collections::HashMap;

use crate::models::Quote;

pub use batch::{BatchQuoteService, QuoteServiceTrait};
pub use rate_limiter::RateLimiter;
pub use report::{BatchReport, QuoteBatch};

/// Ticker → quote, `None` when no data is available for the ticker.
pub type QuoteMap = HashMap<String, Option<Quote>>;
