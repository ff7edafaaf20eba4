//! Command-line arguments.
use clap::{Parser, Subcommand};
use pulsefolio_core::Holding;
use pulsefolio_market_data::provider::finnhub::DEFAULT_NEWS_LOOKBACK_DAYS;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const MAX_NEWS_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Parser)]
#[command(name = "pulsefolio", version, about = "Live quotes and portfolio valuation")]
pub struct Args {
    /// Print JSON instead of a table.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Latest quote for each ticker.
    Quotes {
        #[arg(required = true)]
        tickers: Vec<String>,
    },
    /// Value holdings given as TICKER=QUANTITY.
    Value {
        #[arg(required = true, value_parser = parse_holding)]
        holdings: Vec<Holding>,
    },
    /// Recent company news for one ticker.
    News {
        ticker: String,
        /// Days of history, 1 to 365.
        #[arg(
            long,
            default_value_t = DEFAULT_NEWS_LOOKBACK_DAYS,
            value_parser = clap::value_parser!(i64).range(1..=MAX_NEWS_LOOKBACK_DAYS)
        )]
        days: i64,
    },
}

/// Parse `TICKER=QUANTITY`, e.g. `AAPL=10` or `VOO=2.5`.
pub fn parse_holding(raw: &str) -> Result<Holding, String> {
    let (ticker, quantity) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TICKER=QUANTITY, got '{}'", raw))?;

    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(format!("missing ticker in '{}'", raw));
    }

    let quantity = Decimal::from_str(quantity.trim())
        .map_err(|e| format!("invalid quantity in '{}': {}", raw, e))?;

    Ok(Holding::new(ticker, quantity))
}
