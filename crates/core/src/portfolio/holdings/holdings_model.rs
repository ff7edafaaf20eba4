use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A held position supplied by the caller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub ticker: String,
    pub quantity: Decimal,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            quantity,
        }
    }
}

/// Holding merged with its quote.
///
/// Every market field is `None` when no quote was available; consumers
/// should show "market data unavailable" rather than zero.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedHolding {
    pub ticker: String,
    pub quantity: Decimal,

    // Quote fields
    pub current_price: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub day_change: Option<Decimal>,
    pub day_change_percent: Option<Decimal>,
    pub quote_fetched_at: Option<DateTime<Utc>>,

    /// quantity × current price
    pub current_value: Option<Decimal>,
    /// quantity × absolute day change
    pub day_contribution: Option<Decimal>,
}

impl EnrichedHolding {
    /// A holding with no market data at all.
    pub fn unpriced(ticker: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            quantity,
            current_price: None,
            previous_close: None,
            day_change: None,
            day_change_percent: None,
            quote_fetched_at: None,
            current_value: None,
            day_contribution: None,
        }
    }

    pub fn has_market_data(&self) -> bool {
        self.current_price.is_some()
    }
}
