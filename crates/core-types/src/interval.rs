use crate::error::CoreError;

/// The fixed set of candle intervals the market-data endpoint understands.
pub const SUPPORTED_INTERVALS: [&str; 14] = [
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
];

/// Rejects interval strings outside the supported set before they reach the
/// wire, so a typo fails fast instead of as an opaque HTTP error.
pub fn validate_interval(interval: &str) -> Result<(), CoreError> {
    if SUPPORTED_INTERVALS.contains(&interval) {
        Ok(())
    } else {
        Err(CoreError::UnsupportedInterval(interval.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_intervals() {
        for interval in SUPPORTED_INTERVALS {
            assert!(validate_interval(interval).is_ok());
        }
    }

    #[test]
    fn rejects_unknown_interval() {
        assert!(validate_interval("7m").is_err());
        assert!(validate_interval("").is_err());
    }
}
