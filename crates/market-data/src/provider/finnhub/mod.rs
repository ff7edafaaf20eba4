//! Finnhub quote fetcher.
//!
//! - Latest quotes via /quote
//! - Company news via /company-news
//!
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{MarketDataConfig, DEFAULT_BASE_URL, DEFAULT_FETCH_TIMEOUT};
use crate::errors::MarketDataError;
use crate::models::{NewsArticle, Quote};
use crate::provider::{FetchOutcome, QuoteFetcher};

const PROVIDER_ID: &str = "FINNHUB";

/// Default news lookback, in days.
pub const DEFAULT_NEWS_LOOKBACK_DAYS: i64 = 7;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Default, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Change
    d: Option<f64>,
    /// Percent change
    dp: Option<f64>,
    /// Previous close
    pc: Option<f64>,
}

/// Item from /company-news endpoint
#[derive(Debug, Deserialize)]
struct NewsItem {
    #[serde(default)]
    headline: String,
    summary: Option<String>,
    source: Option<String>,
    url: Option<String>,
    /// Publish time (Unix)
    datetime: Option<i64>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubQuoteFetcher
// ============================================================================

pub struct FinnhubQuoteFetcher {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubQuoteFetcher {
    /// Create a fetcher against the public API with the default timeout.
    pub fn new(api_key: String) -> Result<Self, MarketDataError> {
        Self::with_options(api_key, DEFAULT_BASE_URL.to_string(), DEFAULT_FETCH_TIMEOUT)
    }

    /// Build from configuration. Fails once, here, when no API key is set.
    pub fn from_config(config: &MarketDataConfig) -> Result<Self, MarketDataError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            })?;

        Self::with_options(api_key, config.base_url.clone(), config.fetch_timeout)
    }

    pub fn with_options(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, MarketDataError> {
        if api_key.trim().is_empty() {
            return Err(MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    /// Make a GET request to the Finnhub API and return the body.
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let request = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(params);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    ticker: ticker_param(params),
                }
            } else {
                MarketDataError::Network(e)
            }
        })?;

        let status = response.status();

        // 403 is what Finnhub answers once the plan quota is exhausted
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::Upstream {
                status: status.as_u16(),
                message: "Invalid or missing API key".to_string(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    ticker: ticker_param(params),
                }
            } else {
                MarketDataError::MalformedResponse(format!("Failed to read response: {}", e))
            }
        })?;

        if !status.is_success() {
            let message = upstream_error_message(&body).unwrap_or(body);
            return Err(MarketDataError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        // Finnhub sometimes reports errors with a 200 status
        if let Some(message) = upstream_error_message(&body) {
            return Err(MarketDataError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<Option<Quote>, MarketDataError> {
        let text = self.get("/quote", &[("symbol", ticker)]).await?;
        parse_quote(ticker, &text, Utc::now())
    }

    /// Fetch recent company news for a ticker.
    ///
    /// Articles are returned newest first.
    pub async fn company_news(
        &self,
        ticker: &str,
        lookback_days: i64,
    ) -> Result<Vec<NewsArticle>, MarketDataError> {
        let to = Utc::now();
        let from = chrono::Duration::try_days(lookback_days.max(1))
            .and_then(|lookback| to.checked_sub_signed(lookback))
            .ok_or_else(|| {
                MarketDataError::InvalidInput(format!(
                    "news lookback of {} days is out of range",
                    lookback_days
                ))
            })?;
        let from_date = from.format("%Y-%m-%d").to_string();
        let to_date = to.format("%Y-%m-%d").to_string();

        let text = self
            .get(
                "/company-news",
                &[
                    ("symbol", ticker),
                    ("from", from_date.as_str()),
                    ("to", to_date.as_str()),
                ],
            )
            .await?;

        let articles = parse_news(&text)?;

        debug!(
            "Finnhub: fetched {} news articles for {} ({} to {})",
            articles.len(),
            ticker,
            from_date,
            to_date
        );

        Ok(articles)
    }
}

#[async_trait]
impl QuoteFetcher for FinnhubQuoteFetcher {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, ticker: &str) -> FetchOutcome {
        debug!("Fetching latest quote for {} from Finnhub", ticker);

        let outcome = FetchOutcome::from(self.fetch_quote(ticker).await);
        if let FetchOutcome::Failed(error) = &outcome {
            warn!("Finnhub quote for {} failed: {}", ticker, error);
        }
        outcome
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Decode a /quote body into a canonical quote.
///
/// Finnhub answers unknown symbols with `c == 0` and a null `d` rather than
/// an error; that sentinel, and a body with no fields at all, map to `None`.
fn parse_quote(
    ticker: &str,
    text: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Option<Quote>, MarketDataError> {
    let response: QuoteResponse = serde_json::from_str(text).map_err(|e| {
        MarketDataError::MalformedResponse(format!("Failed to parse quote response: {}", e))
    })?;

    let no_data_sentinel = response.c == Some(0.0) && response.d.is_none();
    let empty = response.c.is_none()
        && response.d.is_none()
        && response.dp.is_none()
        && response.pc.is_none();

    if no_data_sentinel || empty {
        debug!("Finnhub has no quote data for {}", ticker);
        return Ok(None);
    }

    Ok(Some(Quote {
        ticker: ticker.to_string(),
        current_price: to_decimal(response.c),
        previous_close: to_decimal(response.pc),
        day_change: to_decimal(response.d),
        day_change_percent: to_decimal(response.dp),
        fetched_at,
    }))
}

fn parse_news(text: &str) -> Result<Vec<NewsArticle>, MarketDataError> {
    let items: Vec<NewsItem> = serde_json::from_str(text).map_err(|e| {
        MarketDataError::MalformedResponse(format!("Failed to parse news response: {}", e))
    })?;

    let mut articles: Vec<NewsArticle> = items
        .into_iter()
        .filter(|item| !item.headline.trim().is_empty())
        .map(|item| NewsArticle {
            headline: item.headline,
            summary: item.summary.filter(|s| !s.is_empty()),
            source: item.source.filter(|s| !s.is_empty()),
            url: item.url.filter(|s| !s.is_empty()),
            published_at: item
                .datetime
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
        })
        .collect();

    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    Ok(articles)
}

/// Non-finite values have no decimal form and are treated as absent.
fn to_decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(|v| Decimal::try_from(v).ok())
}

fn upstream_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|resp| resp.error)
}

fn ticker_param(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .find(|(key, _)| *key == "symbol")
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
