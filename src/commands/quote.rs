use crate::error::AppError;
use crate::services;

pub async fn run(symbol: &str) {
    match fetch_and_print(symbol).await {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error fetching data: {}", e);
            std::process::exit(1);
        }
    }
}

async fn fetch_and_print(symbol: &str) -> Result<(), AppError> {
    let mut client = super::build_client();
    let quote = client.quote(symbol).await?;

    let name = quote.long_name.as_deref().unwrap_or(&quote.symbol);
    println!("📊 {} ({})\n", name, quote.symbol);

    println!("   Current Price: {}", format_optional_money(quote.current_price));
    println!("   Market Cap:    {}", format_optional_money(quote.market_cap));
    println!("   P/E Ratio:     {}", format_optional_number(quote.trailing_pe));
    if let (Some(change), Some(percent)) = (quote.day_change(), quote.day_change_percent()) {
        let arrow = if change >= 0.0 { "▲" } else { "▼" };
        println!("   Day Change:    {} {:.2} ({:.2}%)", arrow, change, percent);
    }

    println!("\n🏢 Company Overview");
    println!("   Sector:   {}", quote.sector.as_deref().unwrap_or("N/A"));
    println!("   Industry: {}", quote.industry.as_deref().unwrap_or("N/A"));
    println!("   Website:  {}", quote.website.as_deref().unwrap_or("N/A"));

    let sentiment = services::classify(quote.business_summary.as_deref());
    println!("   Sentiment: {}", sentiment);

    if let Some(summary) = &quote.business_summary {
        println!("\n   {}", truncate(summary, 500));
    }

    println!("\n📈 History: {} daily bars", quote.history.len());
    if let (Some(first), Some(last)) = (quote.history.first(), quote.history.last()) {
        println!(
            "   {} → {}   last close {:.2}",
            first.time.format("%Y-%m-%d"),
            last.time.format("%Y-%m-%d"),
            last.close
        );
    }

    println!("⏱  Intraday: {} 5-minute bars", quote.intraday.len());

    Ok(())
}

fn format_optional_money(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${:.2}", v),
        None => "N/A".to_string(),
    }
}

fn format_optional_number(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "N/A".to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 500), "short");
        let long = "a".repeat(600);
        let result = truncate(&long, 500);
        assert_eq!(result.chars().count(), 503); // 500 + "..."
    }

    #[test]
    fn test_optional_formatting() {
        assert_eq!(format_optional_money(Some(12.345)), "$12.35");
        assert_eq!(format_optional_money(None), "N/A");
        assert_eq!(format_optional_number(Some(31.2)), "31.20");
    }
}
