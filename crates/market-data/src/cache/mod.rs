//! In-memory, time-bounded quote cache.
//!
//! Entries are never evicted. Freshness is computed lazily on read: an entry
//! older than the TTL is still returned, flagged stale, so the batch layer can
//! fall back to it when a refresh fails. Growth is bounded only by the set of
//! tickers ever requested.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::{debug, warn};

use crate::config::DEFAULT_CACHE_TTL;
use crate::models::Quote;

/// Entry count above which a warning is logged once.
const LARGE_CACHE_WARN_THRESHOLD: usize = 10_000;

#[derive(Debug)]
struct CacheEntry {
    quote: Quote,
    stored_at: Instant,
}

/// A cache hit.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedQuote {
    pub quote: Quote,
    /// `true` while the entry is younger than the TTL.
    pub is_fresh: bool,
}

/// Thread-safe ticker → quote cache.
///
/// Backed by a sharded map, so operations on different tickers do not
/// contend and each `get`/`put` on one ticker is atomic. Concurrent `put`s on
/// the same ticker are last-writer-wins.
#[derive(Debug)]
pub struct QuoteCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a ticker. Stale entries are returned with `is_fresh == false`.
    pub fn get(&self, ticker: &str) -> Option<CachedQuote> {
        let entry = self.entries.get(ticker)?;
        let is_fresh = entry.stored_at.elapsed() < self.ttl;

        debug!(
            "Quote cache {} for {}",
            if is_fresh { "hit" } else { "stale hit" },
            ticker
        );

        Some(CachedQuote {
            quote: entry.quote.clone(),
            is_fresh,
        })
    }

    /// Store a quote, replacing any previous entry and restarting its TTL.
    pub fn put(&self, ticker: &str, quote: Quote) {
        let previous = self.entries.insert(
            ticker.to_string(),
            CacheEntry {
                quote,
                stored_at: Instant::now(),
            },
        );

        if previous.is_none() && self.entries.len() == LARGE_CACHE_WARN_THRESHOLD {
            warn!(
                "Quote cache holds {} tickers; entries are never evicted",
                LARGE_CACHE_WARN_THRESHOLD
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
