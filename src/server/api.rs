use crate::error::AppError;
use crate::models::{PortfolioSummary, Position, Quote};
use crate::server::AppState;
use crate::services::market_hours::get_cache_max_age;
use crate::services::{self, ResponseCache, Sentiment};
use axum::{
    extract::{Path, State},
    http::{header::CACHE_CONTROL, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

/// Quote page payload: the quote record plus derived display fields
#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: Quote,
    pub sentiment: Sentiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_change_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    pub symbol: Option<String>,
}

/// Query parameters for /screener. Symbols arrive either comma-separated
/// (`symbols=AAPL,TSLA`) or repeated (`symbol=AAPL&symbol=TSLA`).
#[derive(Debug, Deserialize)]
pub struct ScreenerQuery {
    pub symbols: Option<String>,
    #[serde(default)]
    pub symbol: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub cache_entries: usize,
    pub positions: usize,
    pub market_open: bool,
}

fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::InsufficientHistory(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        AppError::Network(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Uniform error body: every failure surfaces as `{"error": "..."}`
fn error_response(error: &AppError) -> Response {
    warn!(error = %error, "Request failed");
    (status_for(error), Json(json!({ "error": error.to_string() }))).into_response()
}

fn ok_response<T: Serialize>(value: &T) -> Response {
    let mut headers = HeaderMap::new();
    let cache_max_age = get_cache_max_age();
    if let Ok(header_value) = format!("max-age={}", cache_max_age).parse() {
        headers.insert(CACHE_CONTROL, header_value);
    }
    (headers, Json(value)).into_response()
}

fn require_symbol(raw: Option<&str>) -> Result<String, AppError> {
    let symbol = raw.unwrap_or("").trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::InvalidInput(
            "symbol parameter must not be empty".to_string(),
        ));
    }
    Ok(symbol)
}

/// GET /quote?symbol=AAPL - quote fields, sentiment label and both bar series
#[instrument(skip(app_state))]
pub async fn quote_handler(
    State(app_state): State<AppState>,
    Query(params): Query<SymbolQuery>,
) -> Response {
    let symbol = match require_symbol(params.symbol.as_deref()) {
        Ok(symbol) => symbol,
        Err(e) => return error_response(&e),
    };

    let key = ResponseCache::signature("quote", &[&symbol]);
    if let Some(cached) = app_state.cache.get::<QuoteResponse>(&key).await {
        return ok_response(&cached);
    }

    let result = {
        let mut client = app_state.provider.clone();
        client.quote(&symbol).await
    };

    match result {
        Ok(quote) => {
            let sentiment = services::classify(quote.business_summary.as_deref());
            info!(
                symbol = %symbol,
                history_bars = quote.history.len(),
                intraday_bars = quote.intraday.len(),
                %sentiment,
                "Returning quote"
            );
            let response = QuoteResponse {
                sentiment,
                day_change: quote.day_change(),
                day_change_percent: quote.day_change_percent(),
                quote,
            };
            app_state.cache.put(&key, &response).await;
            ok_response(&response)
        }
        Err(e) => error_response(&e.into()),
    }
}

/// GET /screener?symbols=AAPL,TSLA,MSFT - batch quote rows, skip-on-error
#[instrument(skip(app_state))]
pub async fn screener_handler(
    State(app_state): State<AppState>,
    Query(params): Query<ScreenerQuery>,
) -> Response {
    let mut symbols = services::parse_symbols(params.symbols.as_deref().unwrap_or(""));
    for raw in &params.symbol {
        let symbol = raw.trim().to_uppercase();
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return error_response(&AppError::InvalidInput(
            "at least one symbol is required".to_string(),
        ));
    }

    let key_parts: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
    let key = ResponseCache::signature("screener", &key_parts);
    if let Some(cached) = app_state
        .cache
        .get::<crate::models::ScreenerReport>(&key)
        .await
    {
        return ok_response(&cached);
    }

    let report = {
        let mut client = app_state.provider.clone();
        services::run_screener(&mut client, &symbols).await
    };

    info!(
        requested = symbols.len(),
        resolved = report.rows.len(),
        skipped = report.skipped.len(),
        "Screener complete"
    );

    app_state.cache.put(&key, &report).await;
    ok_response(&report)
}

/// GET /forecast?symbol=AAPL - fitted history plus 30-day forecast
#[instrument(skip(app_state))]
pub async fn forecast_handler(
    State(app_state): State<AppState>,
    Query(params): Query<SymbolQuery>,
) -> Response {
    let symbol = match require_symbol(params.symbol.as_deref()) {
        Ok(symbol) => symbol,
        Err(e) => return error_response(&e),
    };

    let key = ResponseCache::signature("forecast", &[&symbol]);
    if let Some(cached) = app_state.cache.get::<crate::models::Forecast>(&key).await {
        return ok_response(&cached);
    }

    let result = {
        let mut client = app_state.provider.clone();
        services::forecast_symbol(&mut client, &symbol).await
    };

    match result {
        Ok(forecast) => {
            info!(
                symbol = %symbol,
                trained_on = forecast.trained_on,
                horizon_days = forecast.horizon_days,
                "Returning forecast"
            );
            app_state.cache.put(&key, &forecast).await;
            ok_response(&forecast)
        }
        Err(e) => error_response(&e),
    }
}

/// GET /portfolio - price the session book and report P/L
#[instrument(skip(app_state))]
pub async fn portfolio_handler(State(app_state): State<AppState>) -> Response {
    let positions = app_state.book.list().await;
    if positions.is_empty() {
        return ok_response(&PortfolioSummary::default());
    }

    let summary = {
        let mut client = app_state.provider.clone();
        services::summarize(&mut client, &positions).await
    };

    info!(
        positions = positions.len(),
        priced = summary.rows.len(),
        skipped = summary.skipped.len(),
        total_pnl = summary.total_pnl,
        "Returning portfolio summary"
    );
    ok_response(&summary)
}

/// POST /portfolio - add a position to the session book
#[instrument(skip(app_state))]
pub async fn add_position_handler(
    State(app_state): State<AppState>,
    Json(position): Json<Position>,
) -> Response {
    if position.symbol.trim().is_empty() {
        return error_response(&AppError::InvalidInput(
            "symbol must not be empty".to_string(),
        ));
    }
    if !position.quantity.is_finite() || position.quantity <= 0.0 {
        return error_response(&AppError::InvalidInput(
            "quantity must be positive".to_string(),
        ));
    }
    if !position.buy_price.is_finite() || position.buy_price < 0.0 {
        return error_response(&AppError::InvalidInput(
            "buy_price must not be negative".to_string(),
        ));
    }

    let position = Position::new(&position.symbol, position.quantity, position.buy_price);
    debug!(symbol = %position.symbol, quantity = position.quantity, "Adding position");
    app_state.book.add(position).await;

    let count = app_state.book.len().await;
    (StatusCode::CREATED, Json(json!({ "positions": count }))).into_response()
}

/// DELETE /portfolio/{symbol} - drop every line for a symbol
#[instrument(skip(app_state))]
pub async fn remove_position_handler(
    State(app_state): State<AppState>,
    Path(symbol): Path<String>,
) -> Response {
    let removed = app_state.book.remove(&symbol).await;
    if removed == 0 {
        return error_response(&AppError::NotFound(format!(
            "no positions for {}",
            symbol.to_uppercase()
        )));
    }
    ok_response(&json!({ "removed": removed }))
}

/// GET /health
pub async fn health_handler(State(app_state): State<AppState>) -> Response {
    let response = HealthResponse {
        status: "ok",
        uptime_secs: app_state.started_at.elapsed().as_secs(),
        cache_entries: app_state.cache.len().await,
        positions: app_state.book.len().await,
        market_open: crate::services::market_hours::is_market_open(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
