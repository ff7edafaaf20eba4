//! Tests for BatchQuoteService.
//!
//! Covered contract points:
//!
//! 1. The output key set equals the normalized, deduplicated input
//! 2. Fresh cache hits issue no upstream fetch
//! 3. Stale entries are refetched exactly once and served when the refetch fails
//! 4. Partial failures never fail the batch
//! 5. At most `max_concurrency` fetches are in flight per batch
//! 6. Hung fetches are bounded by the per-fetch timeout

#[cfg(test)]
mod tests {
    use crate::cache::QuoteCache;
    use crate::errors::{FailureKind, MarketDataError};
    use crate::models::Quote;
    use crate::provider::{FetchOutcome, QuoteFetcher};
    use crate::service::{BatchQuoteService, QuoteServiceTrait, RateLimiter};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    // =========================================================================
    // Mock QuoteFetcher
    // =========================================================================

    #[derive(Clone, Debug)]
    enum MockResponse {
        Price(Decimal),
        NoData,
        Fail,
        Hang,
    }

    #[derive(Default)]
    struct MockFetcher {
        responses: Mutex<HashMap<String, MockResponse>>,
        calls: Mutex<HashMap<String, usize>>,
        delay: Mutex<Option<Duration>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockFetcher {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn respond(&self, ticker: &str, response: MockResponse) {
            self.responses
                .lock()
                .unwrap()
                .insert(ticker.to_string(), response);
        }

        fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        fn calls_for(&self, ticker: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .get(ticker)
                .copied()
                .unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().values().sum()
        }

        fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteFetcher for MockFetcher {
        fn id(&self) -> &'static str {
            "MOCK"
        }

        async fn fetch(&self, ticker: &str) -> FetchOutcome {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(ticker.to_string())
                .or_insert(0) += 1;

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let response = self
                .responses
                .lock()
                .unwrap()
                .get(ticker)
                .cloned()
                .unwrap_or(MockResponse::NoData);

            let outcome = match response {
                MockResponse::Price(price) => {
                    FetchOutcome::Found(Quote::with_day_change(
                        ticker,
                        price,
                        price - dec!(1),
                        dec!(1),
                        dec!(0.5),
                    ))
                }
                MockResponse::NoData => FetchOutcome::NoData,
                MockResponse::Fail => FetchOutcome::Failed(MarketDataError::Upstream {
                    status: 502,
                    message: "Bad Gateway".to_string(),
                }),
                MockResponse::Hang => {
                    futures::future::pending::<()>().await;
                    FetchOutcome::NoData
                }
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn service_with(fetcher: &Arc<MockFetcher>, ttl: Duration) -> BatchQuoteService {
        BatchQuoteService::new(fetcher.clone(), Arc::new(QuoteCache::new(ttl)))
    }

    fn price_of(quotes: &crate::service::QuoteMap, ticker: &str) -> Option<Decimal> {
        quotes
            .get(ticker)
            .and_then(|q| q.as_ref())
            .and_then(|q| q.current_price)
    }

    // =========================================================================
    // Coverage and input validation
    // =========================================================================

    #[tokio::test]
    async fn test_key_set_equals_normalized_deduplicated_input() {
        let fetcher = MockFetcher::new();
        fetcher.respond("AAPL", MockResponse::Price(dec!(150)));
        fetcher.respond("MSFT", MockResponse::Price(dec!(410)));
        // NOPE falls through to NoData

        let service = service_with(&fetcher, Duration::from_secs(60));
        let quotes = service
            .get_quotes(&["aapl", "AAPL", " msft ", "NOPE", "nope"])
            .await
            .unwrap();

        let keys: HashSet<&str> = quotes.keys().map(String::as_str).collect();
        assert_eq!(keys, HashSet::from(["AAPL", "MSFT", "NOPE"]));
        assert_eq!(price_of(&quotes, "AAPL"), Some(dec!(150)));
        assert!(quotes["NOPE"].is_none());

        // Duplicates collapse before fetching
        assert_eq!(fetcher.calls_for("AAPL"), 1);
        assert_eq!(fetcher.calls_for("NOPE"), 1);
    }

    #[tokio::test]
    async fn test_empty_input_rejected_without_fetch() {
        let fetcher = MockFetcher::new();
        let service = service_with(&fetcher, Duration::from_secs(60));

        let result = service.get_quotes::<&str>(&[]).await;
        assert!(matches!(result, Err(MarketDataError::InvalidInput(_))));
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_ticker_rejects_whole_batch() {
        let fetcher = MockFetcher::new();
        fetcher.respond("AAPL", MockResponse::Price(dec!(150)));
        let service = service_with(&fetcher, Duration::from_secs(60));

        let result = service.get_quotes(&["AAPL", "  "]).await;
        assert!(matches!(result, Err(MarketDataError::InvalidInput(_))));

        let result = service.get_quotes(&["AAPL", "BRK B"]).await;
        assert!(matches!(result, Err(MarketDataError::InvalidInput(_))));

        assert_eq!(fetcher.total_calls(), 0);
    }

    // =========================================================================
    // Caching
    // =========================================================================

    #[tokio::test]
    async fn test_second_call_within_ttl_is_cache_hit() {
        let fetcher = MockFetcher::new();
        fetcher.respond("AAPL", MockResponse::Price(dec!(150)));
        let service = service_with(&fetcher, Duration::from_secs(60));

        service.get_quotes(&["AAPL"]).await.unwrap();
        let batch = service.get_quotes_with_report(&["AAPL"]).await.unwrap();

        assert_eq!(fetcher.calls_for("AAPL"), 1);
        assert_eq!(batch.report.cache_hits, 1);
        assert_eq!(batch.report.attempted(), 0);
        assert_eq!(price_of(&batch.quotes, "AAPL"), Some(dec!(150)));
    }

    #[tokio::test]
    async fn test_stale_entry_refetched_once() {
        let fetcher = MockFetcher::new();
        fetcher.respond("AAPL", MockResponse::Price(dec!(150)));
        fetcher.respond("MSFT", MockResponse::Price(dec!(410)));
        let service = service_with(&fetcher, Duration::from_millis(200));

        service.get_quotes(&["AAPL", "MSFT"]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        fetcher.respond("AAPL", MockResponse::Price(dec!(152)));
        let quotes = service.get_quotes(&["AAPL", "MSFT"]).await.unwrap();

        assert_eq!(fetcher.calls_for("AAPL"), 2);
        assert_eq!(fetcher.calls_for("MSFT"), 2);
        assert_eq!(price_of(&quotes, "AAPL"), Some(dec!(152)));
        assert!(service.cache().get("AAPL").unwrap().is_fresh);
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale_and_keeps_entry() {
        let fetcher = MockFetcher::new();
        fetcher.respond("AAPL", MockResponse::Price(dec!(150)));
        let service = service_with(&fetcher, Duration::ZERO);

        service.get_quotes(&["AAPL"]).await.unwrap();

        fetcher.respond("AAPL", MockResponse::Fail);
        let batch = service.get_quotes_with_report(&["AAPL"]).await.unwrap();

        assert_eq!(fetcher.calls_for("AAPL"), 2);
        assert_eq!(price_of(&batch.quotes, "AAPL"), Some(dec!(150)));
        assert_eq!(batch.report.failed, 1);
        assert_eq!(batch.report.served_stale, 1);
        assert_eq!(batch.report.served_cached, 0);

        let cached = service.cache().get("AAPL").unwrap();
        assert_eq!(cached.quote.current_price, Some(dec!(150)));
    }

    /// Stores a fresh quote mid-fetch, as an overlapping batch would, then fails.
    struct RacedFetcher {
        cache: Arc<QuoteCache>,
    }

    #[async_trait]
    impl QuoteFetcher for RacedFetcher {
        fn id(&self) -> &'static str {
            "RACED"
        }

        async fn fetch(&self, ticker: &str) -> FetchOutcome {
            self.cache.put(ticker, Quote::new(ticker, dec!(151)));
            FetchOutcome::Failed(MarketDataError::Timeout {
                ticker: ticker.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_fresh_fallback_not_counted_as_stale() {
        let cache = Arc::new(QuoteCache::new(Duration::from_secs(60)));
        let fetcher = Arc::new(RacedFetcher {
            cache: cache.clone(),
        });
        let service = BatchQuoteService::new(fetcher, cache);

        let batch = service.get_quotes_with_report(&["AAPL"]).await.unwrap();

        assert_eq!(price_of(&batch.quotes, "AAPL"), Some(dec!(151)));
        assert_eq!(batch.report.failed, 1);
        assert_eq!(batch.report.served_stale, 0);
        assert_eq!(batch.report.served_cached, 1);
    }

    #[tokio::test]
    async fn test_no_data_is_absent_and_not_cached() {
        let fetcher = MockFetcher::new();
        fetcher.respond("ZZZZ", MockResponse::NoData);
        let service = service_with(&fetcher, Duration::from_secs(60));

        let batch = service.get_quotes_with_report(&["ZZZZ"]).await.unwrap();

        assert!(batch.quotes["ZZZZ"].is_none());
        assert_eq!(batch.report.no_data, 1);
        assert_eq!(
            batch.report.failures,
            vec![("ZZZZ".to_string(), FailureKind::NoData)]
        );
        assert!(service.cache().get("ZZZZ").is_none());

        // No negative caching: the next call asks upstream again
        service.get_quotes(&["ZZZZ"]).await.unwrap();
        assert_eq!(fetcher.calls_for("ZZZZ"), 2);
    }

    // =========================================================================
    // Partial failure
    // =========================================================================

    #[tokio::test]
    async fn test_partial_failure_does_not_fail_batch() {
        let fetcher = MockFetcher::new();
        fetcher.respond("A", MockResponse::Price(dec!(10)));
        fetcher.respond("B", MockResponse::Fail);
        fetcher.respond("C", MockResponse::Price(dec!(30)));
        let service = service_with(&fetcher, Duration::from_secs(60));

        let batch = service
            .get_quotes_with_report(&["A", "B", "C"])
            .await
            .unwrap();

        assert_eq!(price_of(&batch.quotes, "A"), Some(dec!(10)));
        assert_eq!(price_of(&batch.quotes, "C"), Some(dec!(30)));
        assert!(batch.quotes.contains_key("B"));
        assert!(batch.quotes["B"].is_none());

        assert_eq!(batch.report.requested, 3);
        assert_eq!(batch.report.fetched, 2);
        assert_eq!(batch.report.failed, 1);
        assert_eq!(
            batch.report.failures,
            vec![("B".to_string(), FailureKind::UpstreamUnavailable)]
        );
    }

    #[tokio::test]
    async fn test_result_independent_of_completion_order() {
        let fetcher = MockFetcher::new();
        for (i, ticker) in ["A", "B", "C", "D"].iter().enumerate() {
            fetcher.respond(ticker, MockResponse::Price(Decimal::from(i as i64 + 1)));
        }

        let fast = service_with(&fetcher, Duration::ZERO).with_max_concurrency(1);
        let first = fast.get_quotes(&["A", "B", "C", "D"]).await.unwrap();

        fetcher.set_delay(Duration::from_millis(5));
        let wide = service_with(&fetcher, Duration::ZERO).with_max_concurrency(4);
        let second = wide.get_quotes(&["D", "C", "B", "A"]).await.unwrap();

        for ticker in ["A", "B", "C", "D"] {
            assert_eq!(price_of(&first, ticker), price_of(&second, ticker));
        }
    }

    // =========================================================================
    // Concurrency, timeout, rate limiting
    // =========================================================================

    #[tokio::test]
    async fn test_concurrency_bound_respected() {
        let fetcher = MockFetcher::new();
        for ticker in ["A", "B", "C", "D", "E"] {
            fetcher.respond(ticker, MockResponse::Price(dec!(1)));
        }
        fetcher.set_delay(Duration::from_millis(30));

        let service = service_with(&fetcher, Duration::from_secs(60)).with_max_concurrency(2);
        let quotes = service
            .get_quotes(&["A", "B", "C", "D", "E"])
            .await
            .unwrap();

        assert_eq!(quotes.len(), 5);
        assert_eq!(fetcher.total_calls(), 5);
        assert!(fetcher.max_in_flight() <= 2);
        assert_eq!(fetcher.max_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_hung_fetch_bounded_by_timeout() {
        let fetcher = MockFetcher::new();
        fetcher.respond("SLOW", MockResponse::Hang);
        fetcher.respond("FAST", MockResponse::Price(dec!(5)));

        let service = service_with(&fetcher, Duration::from_secs(60))
            .with_fetch_timeout(Duration::from_millis(50));

        let started = Instant::now();
        let batch = service
            .get_quotes_with_report(&["SLOW", "FAST"])
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(batch.quotes["SLOW"].is_none());
        assert_eq!(price_of(&batch.quotes, "FAST"), Some(dec!(5)));
        assert_eq!(
            batch.report.failures,
            vec![("SLOW".to_string(), FailureKind::UpstreamUnavailable)]
        );
    }

    #[tokio::test]
    async fn test_shared_rate_limiter_consumes_tokens() {
        let fetcher = MockFetcher::new();
        for ticker in ["A", "B", "C"] {
            fetcher.respond(ticker, MockResponse::Price(dec!(1)));
        }
        let limiter = Arc::new(RateLimiter::new(60, 10.0));

        let service =
            service_with(&fetcher, Duration::from_secs(60)).with_rate_limiter(limiter.clone());
        let quotes = service.get_quotes(&["A", "B", "C"]).await.unwrap();

        assert_eq!(quotes.len(), 3);
        assert!(limiter.remaining_tokens() < 7.5);
    }

    #[tokio::test]
    async fn test_usable_through_trait_object() {
        let fetcher = MockFetcher::new();
        fetcher.respond("AAPL", MockResponse::Price(dec!(150)));
        let service: Arc<dyn QuoteServiceTrait> =
            Arc::new(service_with(&fetcher, Duration::from_secs(60)));

        let quotes = service
            .get_quotes(&["AAPL".to_string(), "GONE".to_string()])
            .await
            .unwrap();

        assert_eq!(quotes.len(), 2);
        assert!(quotes["GONE"].is_none());
    }
}
