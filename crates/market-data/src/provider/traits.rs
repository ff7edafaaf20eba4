//! Quote fetcher trait definition.

use async_trait::async_trait;

use super::FetchOutcome;

/// Trait for single-ticker upstream quote sources.
///
/// Implementations perform exactly one upstream call per `fetch`, with no
/// retries and no rate limiting of their own. They must not panic on
/// upstream failure; every failure is reported as
/// [`FetchOutcome::Failed`] or [`FetchOutcome::NoData`].
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use pulsefolio_market_data::provider::{FetchOutcome, QuoteFetcher};
///
/// struct StaticFetcher;
///
/// #[async_trait]
/// impl QuoteFetcher for StaticFetcher {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     async fn fetch(&self, ticker: &str) -> FetchOutcome {
///         FetchOutcome::NoData
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// Unique identifier for this source, used in logs.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for an already-normalized ticker.
    async fn fetch(&self, ticker: &str) -> FetchOutcome;
}
