use serde::{Deserialize, Serialize};

use super::Ohlcv;

/// Snapshot of a security: descriptive fields plus two bar series.
///
/// Every descriptive field may be absent; the provider omits fields freely
/// (indices carry no sector, small caps often carry no trailing P/E).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_pe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_summary: Option<String>,

    /// Daily bars over the quote history range
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Ohlcv>,

    /// 5-minute bars for the most recent session
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intraday: Vec<Ohlcv>,
}

impl Quote {
    /// Empty quote shell for a symbol; fields are filled from provider data
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            long_name: None,
            exchange: None,
            currency: None,
            current_price: None,
            previous_close: None,
            market_cap: None,
            trailing_pe: None,
            sector: None,
            industry: None,
            website: None,
            business_summary: None,
            history: Vec::new(),
            intraday: Vec::new(),
        }
    }

    /// Absolute change since the previous close, when both prices are known
    pub fn day_change(&self) -> Option<f64> {
        match (self.current_price, self.previous_close) {
            (Some(current), Some(prev)) => Some(current - prev),
            _ => None,
        }
    }

    /// Percentage change since the previous close
    pub fn day_change_percent(&self) -> Option<f64> {
        match (self.day_change(), self.previous_close) {
            (Some(change), Some(prev)) if prev != 0.0 => Some(change / prev * 100.0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_change_requires_both_prices() {
        let mut quote = Quote::empty("aapl");
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.day_change(), None);

        quote.current_price = Some(105.0);
        assert_eq!(quote.day_change(), None);

        quote.previous_close = Some(100.0);
        assert_eq!(quote.day_change(), Some(5.0));
        assert_eq!(quote.day_change_percent(), Some(5.0));
    }

    #[test]
    fn test_day_change_percent_zero_previous_close() {
        let mut quote = Quote::empty("X");
        quote.current_price = Some(1.0);
        quote.previous_close = Some(0.0);
        assert_eq!(quote.day_change(), Some(1.0));
        assert_eq!(quote.day_change_percent(), None);
    }
}
