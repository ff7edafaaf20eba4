use std::time::Duration;

use crate::errors::FailureKind;

use super::QuoteMap;

/// Per-batch counters for observability.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// Distinct tickers after normalization.
    pub requested: usize,
    /// Served from a fresh cache entry without a fetch.
    pub cache_hits: usize,
    /// Fetched successfully.
    pub fetched: usize,
    /// Upstream answered with no data.
    pub no_data: usize,
    /// Fetch failed (network, timeout, status, decode).
    pub failed: usize,
    /// Fetch did not succeed and a stale cached quote was served instead.
    pub served_stale: usize,
    /// Fetch did not succeed but a fresh quote had been cached meanwhile.
    pub served_cached: usize,
    /// Tickers whose fetch did not succeed, with the reason.
    pub failures: Vec<(String, FailureKind)>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.fetched + self.no_data + self.failed
    }
}

/// Quotes for one batch together with its report.
#[derive(Clone, Debug)]
pub struct QuoteBatch {
    pub quotes: QuoteMap,
    pub report: BatchReport,
}
