use tracing::{debug, warn};

use crate::models::{ScreenerReport, ScreenerRow};
use crate::services::provider::YahooClient;

/// Split a comma-separated symbol list: trim whitespace, drop empties,
/// uppercase, dedupe preserving first occurrence.
pub fn parse_symbols(input: &str) -> Vec<String> {
    let mut symbols = Vec::new();
    for raw in input.split(',') {
        let symbol = raw.trim().to_uppercase();
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

/// Run the screener over a symbol list.
///
/// One row per symbol that resolved; symbols that fail lookup are recorded
/// in `skipped` rather than aborting the batch.
pub async fn run_screener(client: &mut YahooClient, symbols: &[String]) -> ScreenerReport {
    let mut report = ScreenerReport::default();

    for symbol in symbols {
        match client.company(symbol).await {
            Ok(quote) => {
                debug!(symbol = %symbol, "Screener row resolved");
                report.rows.push(ScreenerRow::from(&quote));
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Skipping symbol in screener");
                report.skipped.push(symbol.clone());
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_trims_and_uppercases() {
        assert_eq!(
            parse_symbols("AAPL, tsla , MSFT"),
            vec!["AAPL", "TSLA", "MSFT"]
        );
    }

    #[test]
    fn test_parse_symbols_drops_empties_and_dupes() {
        assert_eq!(parse_symbols("AAPL,,aapl, ,AAPL"), vec!["AAPL"]);
        assert!(parse_symbols("").is_empty());
        assert!(parse_symbols(" , ,").is_empty());
    }
}
