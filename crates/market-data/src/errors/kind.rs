use std::fmt;

/// Failure category for a market data operation.
///
/// # Behavior Summary
///
/// | Kind | Returned to caller? | Batch result for the ticker |
/// |------|---------------------|-----------------------------|
/// | `UpstreamUnavailable` | No | cached value or absent |
/// | `NoData` | No | cached value or absent |
/// | `Configuration` | Yes (once, at construction) | n/a |
/// | `InvalidInput` | Yes (before any fetch) | n/a |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FailureKind {
    /// Network failure, timeout, non-2xx status or undecodable body.
    UpstreamUnavailable,

    /// The upstream answered but has no data for the ticker.
    NoData,

    /// Missing credential or bad setting.
    Configuration,

    /// Empty or malformed ticker set.
    InvalidInput,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpstreamUnavailable => write!(f, "upstream unavailable"),
            Self::NoData => write!(f, "no data"),
            Self::Configuration => write!(f, "configuration"),
            Self::InvalidInput => write!(f, "invalid input"),
        }
    }
}
