//! Pulsefolio command-line client.
//!
//! ```bash
//! FINNHUB_API_KEY=... pulsefolio quotes AAPL MSFT
//! FINNHUB_API_KEY=... pulsefolio value AAPL=10 MSFT=2.5
//! FINNHUB_API_KEY=... pulsefolio news AAPL --days 3
//! ```
mod args;
mod main_lib;
mod render;

use args::{Args, Command};
use clap::Parser;
use main_lib::{build_state, init_tracing};
use pulsefolio_core::PortfolioValuationServiceTrait;
use pulsefolio_market_data::MarketDataConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = MarketDataConfig::from_env()?;
    let state = build_state(&config)?;

    match args.command {
        Command::Quotes { tickers } => {
            let quotes = state.quote_service.get_quotes(tickers.as_slice()).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&quotes)?);
            } else {
                println!("{}", render::quotes(&quotes));
            }
        }
        Command::Value { holdings } => {
            let valuation = state.valuation_service.value_holdings(&holdings).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&valuation)?);
            } else {
                println!("{}", render::valuation(&valuation));
            }
        }
        Command::News { ticker, days } => {
            let ticker = pulsefolio_market_data::normalize_ticker(&ticker)?;
            let articles = state.fetcher.company_news(&ticker, days).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else {
                println!("{}", render::news(&ticker, &articles));
            }
        }
    }

    tracing::debug!("Cached quotes: {}", state.quote_service.cache().len());
    Ok(())
}
