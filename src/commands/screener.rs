use crate::services;

pub async fn run(symbols_arg: &str) {
    let symbols = services::parse_symbols(symbols_arg);
    if symbols.is_empty() {
        eprintln!("❌ No symbols given. Example: stockdash screener \"AAPL, TSLA, MSFT\"");
        std::process::exit(1);
    }

    println!("🔎 Screening {} symbols...\n", symbols.len());

    let mut client = super::build_client();
    let report = services::run_screener(&mut client, &symbols).await;

    println!(
        "{:<8} {:>12} {:>16} {:>10}  {}",
        "Symbol", "Price", "Market Cap", "P/E", "Sector"
    );
    for row in &report.rows {
        println!(
            "{:<8} {:>12} {:>16} {:>10}  {}",
            row.symbol,
            row.price.map_or("N/A".to_string(), |p| format!("{:.2}", p)),
            row.market_cap
                .map_or("N/A".to_string(), format_market_cap),
            row.trailing_pe
                .map_or("N/A".to_string(), |pe| format!("{:.2}", pe)),
            row.sector.as_deref().unwrap_or("N/A"),
        );
    }

    if !report.skipped.is_empty() {
        println!("\n⚠️  Skipped (lookup failed): {}", report.skipped.join(", "));
    }
    println!(
        "\n✅ {} of {} symbols resolved",
        report.rows.len(),
        symbols.len()
    );
}

fn format_market_cap(cap: f64) -> String {
    if cap >= 1e12 {
        format!("{:.2}T", cap / 1e12)
    } else if cap >= 1e9 {
        format!("{:.2}B", cap / 1e9)
    } else if cap >= 1e6 {
        format!("{:.2}M", cap / 1e6)
    } else {
        format!("{:.0}", cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_market_cap_scales() {
        assert_eq!(format_market_cap(2.9e12), "2.90T");
        assert_eq!(format_market_cap(5.5e9), "5.50B");
        assert_eq!(format_market_cap(7.0e6), "7.00M");
        assert_eq!(format_market_cap(1234.0), "1234");
    }
}
