use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};

use crate::cache::{CachedQuote, QuoteCache};
use crate::config::{MarketDataConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENCY};
use crate::errors::{FailureKind, MarketDataError};
use crate::models::{normalize_ticker, Quote};
use crate::provider::{FetchOutcome, QuoteFetcher};

use super::{BatchReport, QuoteBatch, QuoteMap, RateLimiter};

#[async_trait]
pub trait QuoteServiceTrait: Send + Sync {
    /// Quotes for every requested ticker, keyed by normalized ticker.
    ///
    /// Tickers with no data anywhere map to `None`; they are never missing.
    async fn get_quotes(&self, tickers: &[String]) -> Result<QuoteMap, MarketDataError>;
}

/// Batch quote retrieval over a shared cache.
///
/// Holds no per-batch state. Each call normalizes and deduplicates its
/// tickers, serves fresh cache hits directly, and fetches the rest with at
/// most `max_concurrency` requests in flight. Individual ticker failures
/// never fail the call.
pub struct BatchQuoteService {
    fetcher: Arc<dyn QuoteFetcher>,
    cache: Arc<QuoteCache>,
    max_concurrency: usize,
    fetch_timeout: Duration,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl BatchQuoteService {
    pub fn new(fetcher: Arc<dyn QuoteFetcher>, cache: Arc<QuoteCache>) -> Self {
        Self {
            fetcher,
            cache,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            rate_limiter: None,
        }
    }

    /// Build with concurrency, timeout and optional shared limiter from config.
    ///
    /// The cache is passed in so that its owner decides its TTL and lifetime.
    pub fn from_config(
        fetcher: Arc<dyn QuoteFetcher>,
        cache: Arc<QuoteCache>,
        config: &MarketDataConfig,
    ) -> Self {
        let service = Self::new(fetcher, cache)
            .with_max_concurrency(config.max_concurrency)
            .with_fetch_timeout(config.fetch_timeout);

        match config.requests_per_minute {
            Some(rpm) => service.with_rate_limiter(Arc::new(RateLimiter::new(
                rpm,
                config.max_concurrency as f64,
            ))),
            None => service,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    pub async fn get_quotes<S>(&self, tickers: &[S]) -> Result<QuoteMap, MarketDataError>
    where
        S: AsRef<str> + Sync,
    {
        Ok(self.get_quotes_with_report(tickers).await?.quotes)
    }

    /// Like [`get_quotes`](Self::get_quotes), also returning batch counters.
    pub async fn get_quotes_with_report<S>(
        &self,
        tickers: &[S],
    ) -> Result<QuoteBatch, MarketDataError>
    where
        S: AsRef<str> + Sync,
    {
        let started = Instant::now();
        let wanted = normalize_all(tickers)?;

        let mut report = BatchReport {
            requested: wanted.len(),
            ..BatchReport::default()
        };
        let mut quotes = QuoteMap::with_capacity(wanted.len());
        let mut needs_fetch = Vec::new();

        for ticker in wanted {
            match self.cache.get(&ticker) {
                Some(CachedQuote {
                    quote,
                    is_fresh: true,
                }) => {
                    report.cache_hits += 1;
                    quotes.insert(ticker, Some(quote));
                }
                _ => needs_fetch.push(ticker),
            }
        }

        if !needs_fetch.is_empty() {
            debug!(
                "Fetching {} quotes from {} ({} in flight max)",
                needs_fetch.len(),
                self.fetcher.id(),
                self.max_concurrency
            );

            let outcomes: Vec<(String, FetchOutcome)> = stream::iter(needs_fetch)
                .map(|ticker| self.fetch_one(ticker))
                .buffer_unordered(self.max_concurrency)
                .collect()
                .await;

            for (ticker, outcome) in outcomes {
                let quote = self.merge_outcome(&ticker, outcome, &mut report);
                quotes.insert(ticker, quote);
            }
        }

        report.elapsed = started.elapsed();
        report.failures.sort();

        info!(
            "Quote batch: {} requested, {} cache hits, {} fetched, {} no data, {} failed ({} served stale, {} from cache) in {:.2?}",
            report.requested,
            report.cache_hits,
            report.fetched,
            report.no_data,
            report.failed,
            report.served_stale,
            report.served_cached,
            report.elapsed
        );

        Ok(QuoteBatch { quotes, report })
    }

    /// Fetch one ticker under the shared limiter and timeout.
    ///
    /// Successful quotes are written to the cache as soon as they resolve.
    async fn fetch_one(&self, ticker: String) -> (String, FetchOutcome) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        let outcome = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&ticker))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => FetchOutcome::Failed(MarketDataError::Timeout {
                ticker: ticker.clone(),
            }),
        };

        if let FetchOutcome::Found(quote) = &outcome {
            self.cache.put(&ticker, quote.clone());
        }

        (ticker, outcome)
    }

    /// Resolve the final value for a fetched ticker.
    ///
    /// A failed or empty fetch leaves the cache untouched and falls back to
    /// whatever it holds, fresh or stale.
    fn merge_outcome(
        &self,
        ticker: &str,
        outcome: FetchOutcome,
        report: &mut BatchReport,
    ) -> Option<Quote> {
        let kind = match outcome {
            FetchOutcome::Found(quote) => {
                report.fetched += 1;
                return Some(quote);
            }
            FetchOutcome::NoData => {
                report.no_data += 1;
                debug!("No quote data for {}", ticker);
                FailureKind::NoData
            }
            FetchOutcome::Failed(error) => {
                report.failed += 1;
                warn!(
                    "Quote fetch for {} failed ({}): {}",
                    ticker,
                    error.kind(),
                    error
                );
                error.kind()
            }
        };

        report.failures.push((ticker.to_string(), kind));

        // Another batch may have stored a fresh quote while this fetch ran.
        let cached = self.cache.get(ticker)?;
        if cached.is_fresh {
            report.served_cached += 1;
        } else {
            report.served_stale += 1;
        }
        Some(cached.quote)
    }
}

#[async_trait]
impl QuoteServiceTrait for BatchQuoteService {
    async fn get_quotes(&self, tickers: &[String]) -> Result<QuoteMap, MarketDataError> {
        Ok(self.get_quotes_with_report(tickers).await?.quotes)
    }
}

/// Normalize and deduplicate, rejecting the whole batch on any bad ticker.
fn normalize_all<S: AsRef<str>>(tickers: &[S]) -> Result<BTreeSet<String>, MarketDataError> {
    if tickers.is_empty() {
        return Err(MarketDataError::InvalidInput(
            "ticker set is empty".to_string(),
        ));
    }

    tickers
        .iter()
        .map(|ticker| normalize_ticker(ticker.as_ref()))
        .collect()
}
