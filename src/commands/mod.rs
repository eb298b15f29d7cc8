pub mod forecast;
pub mod quote;
pub mod screener;
pub mod serve;
pub mod status;

use crate::constants::PROVIDER_RATE_LIMIT_PER_MINUTE;
use crate::services::YahooClient;

/// Build a provider client for one-shot CLI use
pub(crate) fn build_client() -> YahooClient {
    match YahooClient::new(true, PROVIDER_RATE_LIMIT_PER_MINUTE) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to create provider client: {}", e);
            std::process::exit(1);
        }
    }
}
