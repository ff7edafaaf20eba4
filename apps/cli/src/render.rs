//! Plain-text rendering. Missing market data is spelled out, never shown as zero.
use pulsefolio_core::{EnrichedHolding, PortfolioValuation};
use pulsefolio_market_data::{NewsArticle, Quote, QuoteMap};
use rust_decimal::Decimal;

pub const UNAVAILABLE: &str = "market data unavailable";

fn amount(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn percent(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v),
        None => "-".to_string(),
    }
}

fn quote_line(ticker: &str, quote: Option<&Quote>) -> String {
    match quote {
        Some(q) => format!(
            "{:<10} {:>12} {:>10} {:>9}  prev {}",
            ticker,
            amount(q.current_price),
            amount(q.day_change),
            percent(q.day_change_percent),
            amount(q.previous_close)
        ),
        None => format!("{:<10} {}", ticker, UNAVAILABLE),
    }
}

/// One line per ticker, sorted by ticker.
pub fn quotes(quotes: &QuoteMap) -> String {
    let mut tickers: Vec<&String> = quotes.keys().collect();
    tickers.sort();

    tickers
        .into_iter()
        .map(|t| quote_line(t, quotes.get(t).and_then(Option::as_ref)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn holding_line(holding: &EnrichedHolding) -> String {
    if !holding.has_market_data() {
        return format!(
            "{:<10} {:>10}  {}",
            holding.ticker, holding.quantity, UNAVAILABLE
        );
    }
    format!(
        "{:<10} {:>10} {:>12} {:>14} {:>12}",
        holding.ticker,
        holding.quantity,
        amount(holding.current_price),
        amount(holding.current_value),
        amount(holding.day_contribution)
    )
}

pub fn valuation(valuation: &PortfolioValuation) -> String {
    let totals = &valuation.totals;
    let mut lines: Vec<String> = valuation.holdings.iter().map(holding_line).collect();

    lines.push(format!(
        "Total {} (day {} / {})",
        amount(Some(totals.total_value)),
        amount(Some(totals.total_day_change)),
        percent(totals.total_day_change_percent)
    ));
    if !totals.is_complete() {
        lines.push(format!(
            "{} holding(s) without market data are excluded from the total",
            totals.unpriced_holdings
        ));
    }
    lines.join("\n")
}

pub fn news(ticker: &str, articles: &[NewsArticle]) -> String {
    if articles.is_empty() {
        return format!("No recent news for {}", ticker);
    }
    articles
        .iter()
        .map(|a| {
            let date = a
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let source = a.source.as_deref().unwrap_or("");
            format!("{:<10} {:<12} {}", date, source, a.headline)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
