use crate::constants::DEFAULT_SYMBOL;
use crate::services::market_hours;

pub async fn run() {
    println!("📊 stockdash status\n");

    if market_hours::is_market_open() {
        println!("🟢 US market: regular session open");
    } else {
        println!("🔴 US market: closed");
    }

    print!("🌐 Provider check ({}): ", DEFAULT_SYMBOL);
    let mut client = super::build_client();
    match client.company(DEFAULT_SYMBOL).await {
        Ok(quote) => {
            println!("reachable ✅");
            if let Some(price) = quote.current_price {
                println!(
                    "   {} last price: {:.2} {}",
                    quote.symbol,
                    price,
                    quote.currency.as_deref().unwrap_or("")
                );
            }
        }
        Err(e) => {
            println!("unreachable ❌");
            eprintln!("   {}", e);
            std::process::exit(1);
        }
    }
}
