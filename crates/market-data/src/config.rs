//! Market data configuration.
//!
//! Settings are read from the process environment (after loading `.env`):
//!
//! | Variable | Default |
//! |----------|---------|
//! | `FINNHUB_API_KEY` | unset |
//! | `FINNHUB_BASE_URL` | `https://finnhub.io/api/v1` |
//! | `PF_QUOTE_CACHE_TTL_SECS` | `60` |
//! | `PF_QUOTE_MAX_CONCURRENCY` | `10` |
//! | `PF_QUOTE_FETCH_TIMEOUT_MS` | `5000` |
//! | `PF_QUOTE_REQUESTS_PER_MINUTE` | unset (no shared limiter) |

use std::str::FromStr;
use std::time::Duration;

use crate::errors::MarketDataError;

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(5000);

const ENV_API_KEY: &str = "FINNHUB_API_KEY";
const ENV_BASE_URL: &str = "FINNHUB_BASE_URL";
const ENV_CACHE_TTL_SECS: &str = "PF_QUOTE_CACHE_TTL_SECS";
const ENV_MAX_CONCURRENCY: &str = "PF_QUOTE_MAX_CONCURRENCY";
const ENV_FETCH_TIMEOUT_MS: &str = "PF_QUOTE_FETCH_TIMEOUT_MS";
const ENV_REQUESTS_PER_MINUTE: &str = "PF_QUOTE_REQUESTS_PER_MINUTE";

#[derive(Clone, Debug)]
pub struct MarketDataConfig {
    /// Upstream credential. Required only when a Finnhub fetcher is built.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Age after which a cached quote is stale.
    pub cache_ttl: Duration,
    /// Maximum in-flight fetches per batch call.
    pub max_concurrency: usize,
    /// Upper bound on a single upstream fetch.
    pub fetch_timeout: Duration,
    /// Shared limit across all batches of one service, if set.
    pub requests_per_minute: Option<u32>,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            requests_per_minute: None,
        }
    }
}

impl MarketDataConfig {
    pub fn from_env() -> Result<Self, MarketDataError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MarketDataError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup(ENV_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let base_url = lookup(ENV_BASE_URL)
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.base_url);

        let cache_ttl = parse_var::<u64, _>(&lookup, ENV_CACHE_TTL_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let max_concurrency = match parse_var::<usize, _>(&lookup, ENV_MAX_CONCURRENCY)? {
            Some(0) => {
                return Err(MarketDataError::InvalidConfigValue {
                    key: ENV_MAX_CONCURRENCY.to_string(),
                    value: "0".to_string(),
                })
            }
            Some(n) => n,
            None => defaults.max_concurrency,
        };

        let fetch_timeout = match parse_var::<u64, _>(&lookup, ENV_FETCH_TIMEOUT_MS)? {
            Some(0) => {
                return Err(MarketDataError::InvalidConfigValue {
                    key: ENV_FETCH_TIMEOUT_MS.to_string(),
                    value: "0".to_string(),
                })
            }
            Some(ms) => Duration::from_millis(ms),
            None => defaults.fetch_timeout,
        };

        let requests_per_minute = match parse_var::<u32, _>(&lookup, ENV_REQUESTS_PER_MINUTE)? {
            Some(0) => None,
            other => other,
        };

        Ok(Self {
            api_key,
            base_url,
            cache_ttl,
            max_concurrency,
            fetch_timeout,
            requests_per_minute,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, MarketDataError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| MarketDataError::InvalidConfigValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}
