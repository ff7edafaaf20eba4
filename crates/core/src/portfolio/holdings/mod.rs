pub mod holdings_model;
pub mod holdings_valuation_service;


pub use holdings_model::*;
pub use holdings_valuation_service::{
    PortfolioValuationService, PortfolioValuationServiceTrait,
};
