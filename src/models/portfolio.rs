use serde::{Deserialize, Serialize};

/// A holding as entered by the user: what was bought, how much, at what price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub buy_price: f64,
}

impl Position {
    pub fn new(symbol: &str, quantity: f64, buy_price: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            quantity,
            buy_price,
        }
    }
}

/// A position priced against the market: current price plus profit/loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    pub symbol: String,
    pub quantity: f64,
    pub buy_price: f64,
    pub current_price: f64,
    pub pnl: f64,
}

impl PortfolioRow {
    /// Price a position. P/L is exactly `(current - buy) * quantity`.
    pub fn price(position: &Position, current_price: f64) -> Self {
        Self {
            symbol: position.symbol.clone(),
            quantity: position.quantity,
            buy_price: position.buy_price,
            current_price,
            pnl: (current_price - position.buy_price) * position.quantity,
        }
    }
}

/// Full portfolio valuation: priced rows, unresolvable symbols, total P/L.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub rows: Vec<PortfolioRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub total_pnl: f64,
}

impl PortfolioSummary {
    /// Total P/L is the exact sum of per-row P/L.
    pub fn from_rows(rows: Vec<PortfolioRow>, skipped: Vec<String>) -> Self {
        let total_pnl = rows.iter().map(|row| row.pnl).sum();
        Self {
            rows,
            skipped,
            total_pnl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_pnl_formula() {
        let position = Position::new("tsla", 10.0, 200.0);
        assert_eq!(position.symbol, "TSLA");

        let row = PortfolioRow::price(&position, 250.0);
        assert_eq!(row.pnl, (250.0 - 200.0) * 10.0);

        // Losses come out negative
        let row = PortfolioRow::price(&position, 180.0);
        assert_eq!(row.pnl, -200.0);
    }

    #[test]
    fn test_summary_total_is_sum_of_rows() {
        let rows = vec![
            PortfolioRow::price(&Position::new("A", 3.0, 10.0), 12.0),
            PortfolioRow::price(&Position::new("B", 2.0, 50.0), 45.0),
            PortfolioRow::price(&Position::new("C", 1.0, 7.5), 7.5),
        ];
        let expected: f64 = rows.iter().map(|r| r.pnl).sum();

        let summary = PortfolioSummary::from_rows(rows, vec!["BAD".to_string()]);
        assert_eq!(summary.total_pnl, expected);
        assert_eq!(summary.total_pnl, 6.0 - 10.0 + 0.0);
        assert_eq!(summary.skipped, vec!["BAD".to_string()]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = PortfolioSummary::from_rows(Vec::new(), Vec::new());
        assert_eq!(summary.total_pnl, 0.0);
        assert!(summary.rows.is_empty());
    }
}
