use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{PortfolioRow, PortfolioSummary, Position};
use crate::services::provider::YahooClient;

/// Session-scoped position book.
///
/// Positions accumulate for the lifetime of the process instead of being
/// rebuilt per interaction; the server shares one book across handlers.
pub struct PortfolioBook {
    positions: RwLock<Vec<Position>>,
}

pub type SharedPortfolioBook = Arc<PortfolioBook>;

impl PortfolioBook {
    pub fn new() -> Self {
        Self {
            positions: RwLock::new(Vec::new()),
        }
    }

    /// Add a position. Repeated buys of the same symbol stay separate lines,
    /// each priced against its own buy price.
    pub async fn add(&self, position: Position) {
        self.positions.write().await.push(position);
    }

    /// Remove every position for a symbol; returns how many were removed
    pub async fn remove(&self, symbol: &str) -> usize {
        let symbol = symbol.to_uppercase();
        let mut positions = self.positions.write().await;
        let before = positions.len();
        positions.retain(|p| p.symbol != symbol);
        before - positions.len()
    }

    pub async fn list(&self) -> Vec<Position> {
        self.positions.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.positions.read().await.len()
    }
}

impl Default for PortfolioBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Price a set of positions against current quotes.
///
/// A position whose symbol fails lookup is skipped and reported; a resolved
/// quote with no current price is priced at 0.
pub async fn summarize(client: &mut YahooClient, positions: &[Position]) -> PortfolioSummary {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for position in positions {
        match client.company(&position.symbol).await {
            Ok(quote) => {
                let current_price = quote.current_price.unwrap_or(0.0);
                rows.push(PortfolioRow::price(position, current_price));
            }
            Err(e) => {
                warn!(symbol = %position.symbol, error = %e, "Skipping position in summary");
                skipped.push(position.symbol.clone());
            }
        }
    }

    PortfolioSummary::from_rows(rows, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_positions_accumulate_across_adds() {
        let book = PortfolioBook::new();
        book.add(Position::new("AAPL", 10.0, 150.0)).await;
        book.add(Position::new("TSLA", 5.0, 200.0)).await;
        book.add(Position::new("AAPL", 2.0, 180.0)).await;

        let positions = book.list().await;
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0].symbol, "AAPL");
        assert_eq!(positions[2].buy_price, 180.0);
    }

    #[tokio::test]
    async fn test_remove_clears_all_lines_for_symbol() {
        let book = PortfolioBook::new();
        book.add(Position::new("AAPL", 10.0, 150.0)).await;
        book.add(Position::new("aapl", 2.0, 180.0)).await;
        book.add(Position::new("TSLA", 5.0, 200.0)).await;

        assert_eq!(book.remove("aapl").await, 2);
        assert_eq!(book.remove("AAPL").await, 0);
        assert_eq!(book.len().await, 1);
    }
}
