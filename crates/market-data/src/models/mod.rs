//! Market data models
//!
//! - `quote` - Canonical quote snapshot (Quote)
//! - `ticker` - Ticker normalization
//! - `news` - Company news articles (NewsArticle)

mod news;
mod quote;
mod ticker;

pub use news::NewsArticle;
pub use quote::Quote;
pub use ticker::normalize_ticker;
