use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::holdings::EnrichedHolding;

/// Portfolio-level aggregates over priced holdings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    /// Sum of `current_value` over holdings that have one.
    pub total_value: Decimal,
    /// Sum of quantity × previous close over holdings that have one.
    pub previous_total: Decimal,
    /// Sum of `day_contribution` over holdings that have one.
    pub total_day_change: Decimal,
    /// `(total_value - previous_total) / previous_total × 100`, 2dp.
    /// `None` when `previous_total` is not positive.
    pub total_day_change_percent: Option<Decimal>,
    /// Holdings left out of `total_value` for lack of a price.
    pub unpriced_holdings: usize,
}

impl PortfolioTotals {
    pub fn is_complete(&self) -> bool {
        self.unpriced_holdings == 0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub holdings: Vec<EnrichedHolding>,
    pub totals: PortfolioTotals,
}
