use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of a ticker's market state at fetch time.
///
/// A `Quote` is never zero-filled to stand in for missing data: a ticker the
/// upstream has nothing for is represented as an absent quote (`None`) by the
/// fetcher and batch layers, not as a `Quote` with zero prices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Uppercase ticker symbol
    pub ticker: String,

    /// Current (last traded) price
    pub current_price: Option<Decimal>,

    /// Previous session close
    pub previous_close: Option<Decimal>,

    /// Absolute change since previous close
    pub day_change: Option<Decimal>,

    /// Percent change since previous close
    pub day_change_percent: Option<Decimal>,

    /// When the quote was fetched from upstream
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    /// Create a quote carrying only a current price.
    pub fn new(ticker: impl Into<String>, current_price: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            current_price: Some(current_price),
            previous_close: None,
            day_change: None,
            day_change_percent: None,
            fetched_at: Utc::now(),
        }
    }

    /// Create a quote with the full set of day-over-day fields.
    pub fn with_day_change(
        ticker: impl Into<String>,
        current_price: Decimal,
        previous_close: Decimal,
        day_change: Decimal,
        day_change_percent: Decimal,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            current_price: Some(current_price),
            previous_close: Some(previous_close),
            day_change: Some(day_change),
            day_change_percent: Some(day_change_percent),
            fetched_at: Utc::now(),
        }
    }
}
