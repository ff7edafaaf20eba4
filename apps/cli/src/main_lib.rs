use std::sync::Arc;

use pulsefolio_core::PortfolioValuationService;
use pulsefolio_market_data::{
    BatchQuoteService, FinnhubQuoteFetcher, MarketDataConfig, QuoteCache,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub fetcher: Arc<FinnhubQuoteFetcher>,
    pub quote_service: Arc<BatchQuoteService>,
    pub valuation_service: PortfolioValuationService,
}

pub fn init_tracing() {
    let log_format = std::env::var("PF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Wire fetcher, cache and services from config.
///
/// Fails when the Finnhub credential is missing.
pub fn build_state(config: &MarketDataConfig) -> anyhow::Result<AppState> {
    let fetcher = Arc::new(FinnhubQuoteFetcher::from_config(config)?);
    let cache = Arc::new(QuoteCache::new(config.cache_ttl));
    let quote_service = Arc::new(BatchQuoteService::from_config(
        fetcher.clone(),
        cache,
        config,
    ));
    let valuation_service = PortfolioValuationService::new(quote_service.clone());

    tracing::debug!(
        "Market data: ttl {:?}, max concurrency {}, fetch timeout {:?}",
        config.cache_ttl,
        config.max_concurrency,
        config.fetch_timeout
    );

    Ok(AppState {
        fetcher,
        quote_service,
        valuation_service,
    })
}
