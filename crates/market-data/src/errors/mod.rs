//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`FailureKind`]: Coarse category used by the batch layer and in logs

mod kind;

pub use kind::FailureKind;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Per-ticker failures (`Timeout`, `RateLimited`, `Upstream`, `MalformedResponse`,
/// `Network`) never escape a batch; they are folded into a
/// [`FetchOutcome`](crate::provider::FetchOutcome) and reported as an absent quote.
/// Only configuration and input errors are returned to callers.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// No credential is configured for the upstream API.
    #[error("Missing API key for {provider}")]
    MissingApiKey {
        /// The provider that needs the key
        provider: String,
    },

    /// A configuration value could not be parsed or is out of range.
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfigValue {
        /// Name of the setting
        key: String,
        /// The rejected raw value
        value: String,
    },

    /// The caller passed an empty ticker set or a malformed ticker.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The upstream call did not finish within the per-fetch timeout.
    #[error("Timeout fetching {ticker}")]
    Timeout {
        /// The ticker being fetched
        ticker: String,
    },

    /// The upstream API rejected the call because of quota (HTTP 429/403).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The upstream API answered with a non-2xx status.
    #[error("Upstream error: HTTP {status} - {message}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Error message or body returned by the provider
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the failure category for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulsefolio_market_data::errors::{FailureKind, MarketDataError};
    ///
    /// let error = MarketDataError::Timeout { ticker: "AAPL".to_string() };
    /// assert_eq!(error.kind(), FailureKind::UpstreamUnavailable);
    ///
    /// let error = MarketDataError::InvalidInput("empty ticker set".to_string());
    /// assert_eq!(error.kind(), FailureKind::InvalidInput);
    /// ```
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingApiKey { .. } | Self::InvalidConfigValue { .. } => {
                FailureKind::Configuration
            }

            Self::InvalidInput(_) => FailureKind::InvalidInput,

            Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::Upstream { .. }
            | Self::MalformedResponse(_)
            | Self::Network(_) => FailureKind::UpstreamUnavailable,
        }
    }

    /// Whether this error should abort the caller rather than degrade one ticker.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::Configuration | FailureKind::InvalidInput
        )
    }
}
