use std::sync::Arc;

use crate::constants::{PROVIDER_RATE_LIMIT_PER_MINUTE, RESPONSE_CACHE_TTL_SECONDS};
use crate::server::{self, AppState};
use crate::services::{SharedRateLimiter, YahooClient};

pub async fn run(port: u16) {
    println!("🚀 Starting stockdash server on port {}", port);

    // Handlers share one client; the shared limiter keeps the window
    // correct even if more clients are added later
    let rate_limiter = Arc::new(SharedRateLimiter::new(PROVIDER_RATE_LIMIT_PER_MINUTE));
    let client = match YahooClient::with_shared_rate_limiter(
        true,
        PROVIDER_RATE_LIMIT_PER_MINUTE,
        Some(rate_limiter),
    ) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to create provider client: {}", e);
            std::process::exit(1);
        }
    };

    println!("📊 Provider rate limit: {} req/min", PROVIDER_RATE_LIMIT_PER_MINUTE);
    println!("💾 Response cache TTL: {}s", RESPONSE_CACHE_TTL_SECONDS);
    println!("💼 Portfolio book: session-scoped (in-memory)");

    let app_state = AppState::new(client);

    if let Err(e) = server::serve(app_state, port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
