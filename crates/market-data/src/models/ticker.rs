use crate::errors::MarketDataError;

/// Normalize a raw ticker into its canonical uppercase form.
///
/// Surrounding whitespace is trimmed. Empty tickers and tickers with embedded
/// whitespace or control characters are rejected.
pub fn normalize_ticker(raw: &str) -> Result<String, MarketDataError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(MarketDataError::InvalidInput(
            "ticker must not be empty".to_string(),
        ));
    }

    if trimmed
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(MarketDataError::InvalidInput(format!(
            "ticker '{}' contains whitespace or control characters",
            trimmed.escape_debug()
        )));
    }

    Ok(trimmed.to_uppercase())
}
