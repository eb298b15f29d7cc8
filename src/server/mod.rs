pub mod api;

use crate::services::{PortfolioBook, ResponseCache, SharedPortfolioBook, YahooClient};
use axum::{
    routing::{delete, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all handlers.
///
/// The provider client is cloned per request rather than shared behind a
/// lock: clones share one rate-limit window through the shared limiter, and
/// a slow batch in one handler must not stall the others.
#[derive(Clone)]
pub struct AppState {
    pub provider: YahooClient,
    pub cache: Arc<ResponseCache>,
    pub book: SharedPortfolioBook,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(provider: YahooClient) -> Self {
        Self {
            provider,
            cache: Arc::new(ResponseCache::with_default_ttl()),
            book: Arc::new(PortfolioBook::new()),
            started_at: Instant::now(),
        }
    }
}

/// Start the axum server
pub async fn serve(app_state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting stockdash server");

    // Background sweep so the cache also shrinks while the server is idle;
    // writes additionally evict stale entries inline
    let purge_cache = app_state.cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(
            crate::constants::RESPONSE_CACHE_TTL_SECONDS as u64,
        ));
        loop {
            interval.tick().await;
            let purged = purge_cache.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired cache entries");
            }
        }
    });

    // Browser dashboards run anywhere; the API itself is read-mostly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    tracing::info!("Registering routes:");
    tracing::info!("  GET    /quote?symbol=AAPL");
    tracing::info!("  GET    /screener?symbols=AAPL,TSLA,MSFT");
    tracing::info!("  GET    /forecast?symbol=AAPL");
    tracing::info!("  GET    /portfolio");
    tracing::info!("  POST   /portfolio");
    tracing::info!("  DELETE /portfolio/{{symbol}}");
    tracing::info!("  GET    /health");

    let app = Router::new()
        .route("/quote", get(api::quote_handler))
        .route("/screener", get(api::screener_handler))
        .route("/forecast", get(api::forecast_handler))
        .route(
            "/portfolio",
            get(api::portfolio_handler).post(api::add_position_handler),
        )
        .route("/portfolio/{symbol}", delete(api::remove_position_handler))
        .route("/health", get(api::health_handler))
        .layer(cors)
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
