use serde::{Deserialize, Serialize};

use super::Quote;

/// One screener result row. Fields mirror the source quote and stay absent
/// when the provider omitted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerRow {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_pe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl From<&Quote> for ScreenerRow {
    fn from(quote: &Quote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            price: quote.current_price,
            market_cap: quote.market_cap,
            trailing_pe: quote.trailing_pe,
            sector: quote.sector.clone(),
        }
    }
}

/// Screener output: one row per symbol that resolved, plus the symbols that
/// failed lookup. Skipped symbols are reported rather than silently dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenerReport {
    pub rows: Vec<ScreenerRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl ScreenerReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_mirrors_quote_fields() {
        let mut quote = Quote::empty("MSFT");
        quote.current_price = Some(420.5);
        quote.sector = Some("Technology".to_string());

        let row = ScreenerRow::from(&quote);
        assert_eq!(row.symbol, "MSFT");
        assert_eq!(row.price, Some(420.5));
        assert_eq!(row.market_cap, None);
        assert_eq!(row.trailing_pe, None);
        assert_eq!(row.sector.as_deref(), Some("Technology"));
    }
}
