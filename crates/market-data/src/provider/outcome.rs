use crate::errors::{FailureKind, MarketDataError};
use crate::models::Quote;

/// Result of a single upstream quote fetch.
///
/// Fetchers report every per-ticker failure through this type instead of
/// `Result::Err`, so one bad ticker cannot abort a batch while the failure
/// category stays visible to the batch layer.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The upstream returned usable data.
    Found(Quote),

    /// The upstream answered but has no data for the ticker.
    NoData,

    /// The fetch failed (network, timeout, status, decode).
    Failed(MarketDataError),
}

impl FetchOutcome {
    /// Collapse to the `Quote | absent` view.
    pub fn into_quote(self) -> Option<Quote> {
        match self {
            Self::Found(quote) => Some(quote),
            Self::NoData | Self::Failed(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Failure category, or `None` when a quote was found.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Found(_) => None,
            Self::NoData => Some(FailureKind::NoData),
            Self::Failed(error) => Some(error.kind()),
        }
    }
}

impl From<Result<Option<Quote>, MarketDataError>> for FetchOutcome {
    fn from(result: Result<Option<Quote>, MarketDataError>) -> Self {
        match result {
            Ok(Some(quote)) => Self::Found(quote),
            Ok(None) => Self::NoData,
            Err(error) => Self::Failed(error),
        }
    }
}
