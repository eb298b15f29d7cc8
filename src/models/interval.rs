use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{INTRADAY_RANGE, QUOTE_HISTORY_RANGE};

/// Bar interval requested from the market-data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// Daily candles
    #[serde(rename = "1d")]
    Daily,
    /// 5-minute intraday candles
    #[serde(rename = "5m")]
    FiveMinute,
}

impl Interval {
    /// Provider query-string representation
    pub fn to_provider_format(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::FiveMinute => "5m",
        }
    }

    /// Range fetched for this interval when the caller does not override it
    pub fn default_range(&self) -> &'static str {
        match self {
            Interval::Daily => QUOTE_HISTORY_RANGE,
            Interval::FiveMinute => INTRADAY_RANGE,
        }
    }

}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_provider_format())
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_format() {
        assert_eq!(Interval::Daily.to_provider_format(), "1d");
        assert_eq!(Interval::FiveMinute.to_provider_format(), "5m");
        assert_eq!(Interval::default(), Interval::Daily);
    }

    #[test]
    fn test_default_ranges() {
        assert_eq!(Interval::Daily.default_range(), "6mo");
        assert_eq!(Interval::FiveMinute.default_range(), "1d");
    }
}
