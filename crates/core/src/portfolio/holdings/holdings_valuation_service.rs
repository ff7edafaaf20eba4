use crate::errors::{Error, Result};
use crate::portfolio::holdings::Holding;
use crate::portfolio::valuation::{enrich, PortfolioValuation};
use async_trait::async_trait;
use log::{debug, warn};
use pulsefolio_market_data::{QuoteMap, QuoteServiceTrait};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;

#[async_trait]
pub trait PortfolioValuationServiceTrait: Send + Sync {
    async fn value_holdings(&self, holdings: &[Holding]) -> Result<PortfolioValuation>;
}

#[derive(Clone)]
pub struct PortfolioValuationService {
    quote_service: Arc<dyn QuoteServiceTrait>,
}

impl PortfolioValuationService {
    pub fn new(quote_service: Arc<dyn QuoteServiceTrait>) -> Self {
        Self { quote_service }
    }

    // Fetch live quotes for the distinct tickers held
    async fn fetch_quotes(&self, holdings: &[Holding]) -> Result<QuoteMap> {
        let tickers: Vec<String> = holdings
            .iter()
            .map(|h| h.ticker.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        debug!("Fetching live quotes for {} tickers", tickers.len());
        Ok(self.quote_service.get_quotes(&tickers).await?)
    }
}

#[async_trait]
impl PortfolioValuationServiceTrait for PortfolioValuationService {
    /// Values each holding at its live price and totals the portfolio.
    ///
    /// Tickers without a quote are kept with empty market fields; only an
    /// invalid ticker or quantity fails the call.
    async fn value_holdings(&self, holdings: &[Holding]) -> Result<PortfolioValuation> {
        validate_holdings(holdings)?;

        if holdings.is_empty() {
            return Ok(PortfolioValuation::default());
        }

        let quotes = self.fetch_quotes(holdings).await?;
        let (holdings, totals) = enrich(holdings, &quotes);

        if totals.unpriced_holdings > 0 {
            warn!(
                "{} of {} holdings have no market data; portfolio value is understated",
                totals.unpriced_holdings,
                holdings.len()
            );
        }

        Ok(PortfolioValuation { holdings, totals })
    }
}

fn validate_holdings(holdings: &[Holding]) -> Result<()> {
    for holding in holdings {
        if holding.quantity < Decimal::ZERO {
            return Err(Error::Validation(format!(
                "Quantity for {} must not be negative, got {}",
                holding.ticker, holding.quantity
            )));
        }
    }
    Ok(())
}
