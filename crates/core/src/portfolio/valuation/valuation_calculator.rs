use log::{debug, warn};
use pulsefolio_market_data::{normalize_ticker, Quote, QuoteMap};
use rust_decimal::Decimal;

use crate::portfolio::holdings::{EnrichedHolding, Holding};
use crate::portfolio::valuation::PortfolioTotals;

const PERCENT_SCALE: u32 = 2;

/// Merges holdings with their quotes and computes portfolio totals.
///
/// Pure and deterministic. A holding whose ticker has no quote in `quotes`
/// (or maps to `None`) stays in the output with every market field `None`
/// and is left out of the totals. A holding whose value would overflow
/// `Decimal`, alone or added to the running totals, is treated the same way.
///
/// # Arguments
///
/// * `holdings` - Positions as supplied by the caller, in output order.
/// * `quotes` - Quotes keyed by normalized ticker, as returned by a batch fetch.
///
pub fn enrich(holdings: &[Holding], quotes: &QuoteMap) -> (Vec<EnrichedHolding>, PortfolioTotals) {
    let mut totals = PortfolioTotals::default();

    let enriched: Vec<EnrichedHolding> = holdings
        .iter()
        .map(|holding| {
            let Some(quote) = lookup_quote(quotes, &holding.ticker) else {
                totals.unpriced_holdings += 1;
                return EnrichedHolding::unpriced(holding.ticker.clone(), holding.quantity);
            };

            let priced = enrich_holding(holding, quote)
                .and_then(|enriched| accumulate(&totals, &enriched).map(|next| (enriched, next)));

            match priced {
                Some((enriched, next)) => {
                    totals = next;
                    enriched
                }
                None => {
                    warn!(
                        "Value of {} x {} is out of range; reporting it without market data",
                        holding.quantity, holding.ticker
                    );
                    totals.unpriced_holdings += 1;
                    EnrichedHolding::unpriced(holding.ticker.clone(), holding.quantity)
                }
            }
        })
        .collect();

    totals.total_day_change_percent = day_change_percent(totals.total_value, totals.previous_total);

    debug!(
        "Enriched {} holdings: value {}, {} unpriced",
        enriched.len(),
        totals.total_value,
        totals.unpriced_holdings
    );

    (enriched, totals)
}

fn lookup_quote<'a>(quotes: &'a QuoteMap, ticker: &str) -> Option<&'a Quote> {
    let key = normalize_ticker(ticker).ok()?;
    quotes.get(&key).and_then(Option::as_ref)
}

/// `quantity × value`; outer `None` on overflow.
fn checked_product(quantity: Decimal, value: Option<Decimal>) -> Option<Option<Decimal>> {
    match value {
        Some(value) => quantity.checked_mul(value).map(Some),
        None => Some(None),
    }
}

/// `None` when a per-holding product overflows.
fn enrich_holding(holding: &Holding, quote: &Quote) -> Option<EnrichedHolding> {
    Some(EnrichedHolding {
        ticker: holding.ticker.clone(),
        quantity: holding.quantity,
        current_price: quote.current_price,
        previous_close: quote.previous_close,
        day_change: quote.day_change,
        day_change_percent: quote.day_change_percent,
        quote_fetched_at: Some(quote.fetched_at),
        current_value: checked_product(holding.quantity, quote.current_price)?,
        day_contribution: checked_product(holding.quantity, quote.day_change)?,
    })
}

/// Totals with `enriched` folded in, or `None` if any sum overflows.
fn accumulate(totals: &PortfolioTotals, enriched: &EnrichedHolding) -> Option<PortfolioTotals> {
    let mut next = totals.clone();

    match enriched.current_value {
        Some(value) => next.total_value = next.total_value.checked_add(value)?,
        None => next.unpriced_holdings += 1,
    }
    if let Some(contribution) = enriched.day_contribution {
        next.total_day_change = next.total_day_change.checked_add(contribution)?;
    }
    if let Some(previous_value) = checked_product(enriched.quantity, enriched.previous_close)? {
        next.previous_total = next.previous_total.checked_add(previous_value)?;
    }

    Some(next)
}

fn day_change_percent(current_total: Decimal, previous_total: Decimal) -> Option<Decimal> {
    if previous_total <= Decimal::ZERO {
        return None;
    }
    let ratio = current_total
        .checked_sub(previous_total)?
        .checked_div(previous_total)?;
    Some(ratio.checked_mul(Decimal::ONE_HUNDRED)?.round_dp(PERCENT_SCALE))
}
