use isahc::{config::Configurable, prelude::*, HttpClient};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration as StdDuration, SystemTime};
use tokio::sync::Mutex as TokioMutex;
use tokio::time::sleep;

use crate::models::{Interval, Ohlcv, Quote};

#[derive(Debug)]
pub enum ProviderError {
    Http(isahc::Error),
    Serialization(serde_json::Error),
    InvalidSymbol(String),
    InvalidResponse(String),
    RateLimit,
    NoData,
}

impl From<isahc::Error> for ProviderError {
    fn from(error: isahc::Error) -> Self {
        ProviderError::Http(error)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(error: serde_json::Error) -> Self {
        ProviderError::Serialization(error)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Http(e) => write!(f, "HTTP error: {}", e),
            ProviderError::Serialization(e) => write!(f, "Serialization error: {}", e),
            ProviderError::InvalidSymbol(s) => write!(f, "Invalid symbol: {}", s),
            ProviderError::InvalidResponse(s) => write!(f, "Invalid response: {}", s),
            ProviderError::RateLimit => write!(f, "Rate limit exceeded"),
            ProviderError::NoData => write!(f, "No data available"),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Http(e) => Some(e),
            ProviderError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProviderError> for crate::error::AppError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::RateLimit => crate::error::AppError::RateLimit,
            ProviderError::InvalidSymbol(s) => crate::error::AppError::InvalidInput(s),
            ProviderError::NoData => {
                crate::error::AppError::NotFound("no data for symbol".to_string())
            }
            ProviderError::Serialization(e) => crate::error::AppError::Parse(e.to_string()),
            other => crate::error::AppError::Network(other.to_string()),
        }
    }
}

/// Shared rate limiter for provider requests across all concurrent tasks
#[derive(Debug)]
pub struct SharedRateLimiter {
    /// Timestamps of recent requests (sliding window)
    request_timestamps: TokioMutex<Vec<SystemTime>>,
    /// Maximum requests allowed per minute
    rate_limit_per_minute: u32,
}

impl SharedRateLimiter {
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            request_timestamps: TokioMutex::new(Vec::new()),
            rate_limit_per_minute,
        }
    }

    /// Enforce rate limiting using a sliding-window algorithm.
    /// Async-safe; may be called from multiple concurrent tasks.
    pub async fn enforce_rate_limit(&self) {
        let current_time = SystemTime::now();
        let mut timestamps = self.request_timestamps.lock().await;

        // Remove timestamps older than 1 minute
        timestamps.retain(|&timestamp| {
            current_time
                .duration_since(timestamp)
                .unwrap_or(StdDuration::from_secs(0))
                < StdDuration::from_secs(60)
        });

        if timestamps.len() >= self.rate_limit_per_minute as usize {
            if let Some(&oldest_request) = timestamps.first() {
                let wait_time = StdDuration::from_secs(60)
                    - current_time
                        .duration_since(oldest_request)
                        .unwrap_or(StdDuration::from_secs(0));

                if !wait_time.is_zero() {
                    // Drop lock before sleeping so other tasks can check the window
                    drop(timestamps);
                    sleep(wait_time + StdDuration::from_millis(100)).await;
                    let mut timestamps = self.request_timestamps.lock().await;
                    timestamps.push(current_time);
                } else {
                    timestamps.push(current_time);
                }
            }
        } else {
            timestamps.push(current_time);
        }
    }
}

/// Client for the public Yahoo-style quote API.
///
/// Two endpoints are used: the chart endpoint for OHLCV bars (parallel
/// timestamp/open/high/low/close/volume arrays) and the quote-summary
/// endpoint for descriptive company fields.
#[derive(Clone)]
pub struct YahooClient {
    client: HttpClient,
    base_url: String,
    rate_limit_per_minute: u32,
    request_timestamps: Vec<SystemTime>,
    user_agents: Vec<String>,
    random_agent: bool,
    /// Optional shared rate limiter (if None, uses per-instance rate limiting)
    shared_rate_limiter: Option<Arc<SharedRateLimiter>>,
}

impl YahooClient {
    pub fn new(random_agent: bool, rate_limit_per_minute: u32) -> Result<Self, ProviderError> {
        Self::with_shared_rate_limiter(random_agent, rate_limit_per_minute, None)
    }

    /// Create a client with an optional shared rate limiter
    pub fn with_shared_rate_limiter(
        random_agent: bool,
        rate_limit_per_minute: u32,
        shared_rate_limiter: Option<Arc<SharedRateLimiter>>,
    ) -> Result<Self, ProviderError> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
        ];

        Ok(YahooClient {
            client,
            base_url: "https://query1.finance.yahoo.com/".to_string(),
            rate_limit_per_minute,
            request_timestamps: Vec::new(),
            user_agents,
            random_agent,
            shared_rate_limiter,
        })
    }

    fn get_user_agent(&self) -> String {
        if self.random_agent {
            use rand::seq::SliceRandom;
            self.user_agents
                .choose(&mut rand::thread_rng())
                .unwrap_or(&self.user_agents[0])
                .clone()
        } else {
            self.user_agents[0].clone()
        }
    }

    async fn enforce_rate_limit(&mut self) {
        if let Some(ref limiter) = self.shared_rate_limiter {
            limiter.enforce_rate_limit().await;
        } else {
            let current_time = SystemTime::now();

            self.request_timestamps.retain(|&timestamp| {
                current_time
                    .duration_since(timestamp)
                    .unwrap_or(StdDuration::from_secs(0))
                    < StdDuration::from_secs(60)
            });

            if self.request_timestamps.len() >= self.rate_limit_per_minute as usize {
                if let Some(&oldest_request) = self.request_timestamps.first() {
                    let wait_time = StdDuration::from_secs(60)
                        - current_time
                            .duration_since(oldest_request)
                            .unwrap_or(StdDuration::from_secs(0));
                    if !wait_time.is_zero() {
                        sleep(wait_time + StdDuration::from_millis(100)).await;
                    }
                }
            }

            self.request_timestamps.push(current_time);
        }
    }

    async fn make_request(&mut self, url: &str) -> Result<Value, ProviderError> {
        const MAX_RETRIES: u32 = 5;

        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            self.enforce_rate_limit().await;

            if attempt > 0 {
                let delay = StdDuration::from_secs_f64(
                    2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>(),
                );
                let delay = delay.min(StdDuration::from_secs(60));
                let reason = last_error.as_deref().unwrap_or("unknown error");
                tracing::info!(
                    "Provider retry backoff: attempt {}/{} - reason: {}, waiting {:.1}s before retry",
                    attempt + 1,
                    MAX_RETRIES,
                    reason,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }

            let user_agent = self.get_user_agent();
            tracing::debug!("PROVIDER_REQUEST: attempt={}, url={}", attempt + 1, url);

            let request = isahc::Request::builder()
                .uri(url)
                .method("GET")
                .header("Accept", "application/json, text/plain, */*")
                .header("Accept-Language", "en-US,en;q=0.9")
                .header("Connection", "keep-alive")
                .header("User-Agent", &user_agent)
                .body(())
                .map_err(|e| {
                    ProviderError::InvalidResponse(format!("Request build error: {}", e))
                })?;

            let response = self.client.send_async(request).await;

            match response {
                Ok(mut resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        match resp.text().await {
                            Ok(text) => match serde_json::from_str::<Value>(&text) {
                                Ok(data) => return Ok(data),
                                Err(e) => {
                                    last_error = Some(format!("JSON parse error: {}", e));
                                    continue;
                                }
                            },
                            Err(e) => {
                                last_error = Some(format!("Response body error: {}", e));
                                continue;
                            }
                        }
                    } else if status == 404 {
                        // Unknown symbols come back as 404; not retryable
                        return Err(ProviderError::NoData);
                    } else if status == 429 {
                        last_error = Some("Too Many Requests (429) - rate limited".to_string());
                        continue;
                    } else if status.is_server_error() {
                        let status_text = status.canonical_reason().unwrap_or("Unknown");
                        last_error =
                            Some(format!("Server error ({}) - {}", status.as_u16(), status_text));
                        continue;
                    } else if status.is_client_error() {
                        // Other 4xx are request problems; retrying cannot help
                        let status_text = status.canonical_reason().unwrap_or("Unknown");
                        return Err(ProviderError::InvalidResponse(format!(
                            "Client error ({}) - {} - not retryable",
                            status.as_u16(),
                            status_text
                        )));
                    } else {
                        let status_text = status.canonical_reason().unwrap_or("Unknown");
                        last_error =
                            Some(format!("HTTP error ({}) - {}", status.as_u16(), status_text));
                        continue;
                    }
                }
                Err(e) => {
                    last_error = Some(format!("Network error: {}", e));
                    continue;
                }
            }
        }

        Err(ProviderError::InvalidResponse(format!(
            "Max retries exceeded - last error: {}",
            last_error.unwrap_or_else(|| "unknown".to_string())
        )))
    }

    fn validate_symbol(symbol: &str) -> Result<String, ProviderError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty()
            || !symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
        {
            return Err(ProviderError::InvalidSymbol(symbol));
        }
        Ok(symbol)
    }

    /// Fetch OHLCV bars from the chart endpoint.
    ///
    /// Bars with null prices (halted sessions, in-flight candles) are
    /// dropped; output is sorted ascending by time.
    pub async fn history(
        &mut self,
        symbol: &str,
        interval: Interval,
        range: &str,
    ) -> Result<Vec<Ohlcv>, ProviderError> {
        let symbol = Self::validate_symbol(symbol)?;
        let url = format!(
            "{}v8/finance/chart/{}?interval={}&range={}",
            self.base_url,
            symbol,
            interval.to_provider_format(),
            range
        );

        let response_data = self.make_request(&url).await?;
        parse_chart_response(&response_data, &symbol)
    }

    /// Fetch descriptive company/market fields from the quote-summary
    /// endpoint. Absent modules simply leave fields unset.
    pub async fn company(&mut self, symbol: &str) -> Result<Quote, ProviderError> {
        let symbol = Self::validate_symbol(symbol)?;
        let url = format!(
            "{}v10/finance/quoteSummary/{}?modules=price,summaryDetail,assetProfile",
            self.base_url, symbol
        );

        let response_data = self.make_request(&url).await?;
        parse_quote_summary(&response_data, &symbol)
    }

    /// Full quote view: company fields plus daily history and 5-minute
    /// intraday bars, matching the dashboard page.
    pub async fn quote(&mut self, symbol: &str) -> Result<Quote, ProviderError> {
        let mut quote = self.company(symbol).await?;
        quote.history = self
            .history(symbol, Interval::Daily, Interval::Daily.default_range())
            .await?;
        // A missing intraday session (holidays, brand-new listings) should
        // not fail the whole quote
        quote.intraday = match self
            .history(
                symbol,
                Interval::FiveMinute,
                Interval::FiveMinute.default_range(),
            )
            .await
        {
            Ok(bars) => bars,
            Err(ProviderError::NoData) => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(quote)
    }
}

/// Numeric fields arrive either as a plain number or wrapped as
/// `{"raw": 1.23, "fmt": "1.23"}` depending on the endpoint.
fn raw_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.get("raw").and_then(|v| v.as_f64()))
}

fn parse_chart_response(response: &Value, symbol: &str) -> Result<Vec<Ohlcv>, ProviderError> {
    let chart = response
        .get("chart")
        .ok_or_else(|| ProviderError::InvalidResponse("Missing chart envelope".to_string()))?;

    if let Some(error) = chart.get("error") {
        if !error.is_null() {
            let description = error
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown provider error");
            return Err(ProviderError::InvalidResponse(description.to_string()));
        }
    }

    let result = chart
        .get("result")
        .and_then(|v| v.as_array())
        .filter(|arr| !arr.is_empty())
        .ok_or(ProviderError::NoData)?;

    let data_item = &result[0];

    let times = data_item
        .get("timestamp")
        .and_then(|v| v.as_array())
        .ok_or(ProviderError::NoData)?;

    let quote_block = data_item
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| ProviderError::InvalidResponse("Missing indicators.quote".to_string()))?;

    let opens = quote_block
        .get("open")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::InvalidResponse("Invalid opens".to_string()))?;
    let highs = quote_block
        .get("high")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::InvalidResponse("Invalid highs".to_string()))?;
    let lows = quote_block
        .get("low")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::InvalidResponse("Invalid lows".to_string()))?;
    let closes = quote_block
        .get("close")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::InvalidResponse("Invalid closes".to_string()))?;
    let volumes = quote_block
        .get("volume")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::InvalidResponse("Invalid volumes".to_string()))?;

    let length = times.len();
    if [opens.len(), highs.len(), lows.len(), closes.len(), volumes.len()]
        .iter()
        .any(|&len| len != length)
    {
        return Err(ProviderError::InvalidResponse(
            "Inconsistent array lengths".to_string(),
        ));
    }

    let mut bars = Vec::with_capacity(length);
    for i in 0..length {
        let timestamp = times[i].as_i64().ok_or_else(|| {
            ProviderError::InvalidResponse(format!("Invalid timestamp at index {}", i))
        })?;
        let time = chrono::DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
            ProviderError::InvalidResponse(format!(
                "Cannot convert timestamp {} at index {}",
                timestamp, i
            ))
        })?;

        // Null slots mark bars the exchange never printed; skip them
        let (open, high, low, close) = match (
            opens[i].as_f64(),
            highs[i].as_f64(),
            lows[i].as_f64(),
            closes[i].as_f64(),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };

        bars.push(Ohlcv::new(time, open, high, low, close, volumes[i].as_u64().unwrap_or(0)).tagged(symbol));
    }

    if bars.is_empty() {
        return Err(ProviderError::NoData);
    }

    bars.sort_by(|a, b| a.time.cmp(&b.time));
    Ok(bars)
}

fn parse_quote_summary(response: &Value, symbol: &str) -> Result<Quote, ProviderError> {
    let envelope = response
        .get("quoteSummary")
        .ok_or_else(|| ProviderError::InvalidResponse("Missing quoteSummary envelope".to_string()))?;

    if let Some(error) = envelope.get("error") {
        if !error.is_null() {
            return Err(ProviderError::NoData);
        }
    }

    let result = envelope
        .get("result")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or(ProviderError::NoData)?;

    let mut quote = Quote::empty(symbol);

    if let Some(price) = result.get("price") {
        if let Some(name) = price.get("longName").and_then(|v| v.as_str()) {
            quote.long_name = Some(name.to_string());
        }
        if let Some(exchange) = price.get("exchangeName").and_then(|v| v.as_str()) {
            quote.exchange = Some(exchange.to_string());
        }
        if let Some(currency) = price.get("currency").and_then(|v| v.as_str()) {
            quote.currency = Some(currency.to_string());
        }
        if let Some(value) = price.get("regularMarketPrice").and_then(raw_f64) {
            quote.current_price = Some(value);
        }
        if let Some(value) = price.get("regularMarketPreviousClose").and_then(raw_f64) {
            quote.previous_close = Some(value);
        }
        if let Some(value) = price.get("marketCap").and_then(raw_f64) {
            quote.market_cap = Some(value);
        }
    }

    if let Some(detail) = result.get("summaryDetail") {
        if let Some(value) = detail.get("trailingPE").and_then(raw_f64) {
            quote.trailing_pe = Some(value);
        }
        if quote.previous_close.is_none() {
            if let Some(value) = detail.get("previousClose").and_then(raw_f64) {
                quote.previous_close = Some(value);
            }
        }
        if quote.market_cap.is_none() {
            if let Some(value) = detail.get("marketCap").and_then(raw_f64) {
                quote.market_cap = Some(value);
            }
        }
    }

    if let Some(profile) = result.get("assetProfile") {
        if let Some(sector) = profile.get("sector").and_then(|v| v.as_str()) {
            quote.sector = Some(sector.to_string());
        }
        if let Some(industry) = profile.get("industry").and_then(|v| v.as_str()) {
            quote.industry = Some(industry.to_string());
        }
        if let Some(website) = profile.get("website").and_then(|v| v.as_str()) {
            quote.website = Some(website.to_string());
        }
        if let Some(summary) = profile.get("longBusinessSummary").and_then(|v| v.as_str()) {
            quote.business_summary = Some(summary.to_string());
        }
    }

    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_symbol_validation() {
        assert_eq!(YahooClient::validate_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(YahooClient::validate_symbol("BRK.B").unwrap(), "BRK.B");
        assert!(YahooClient::validate_symbol("").is_err());
        assert!(YahooClient::validate_symbol("AAPL; DROP").is_err());
    }

    #[test]
    fn test_parse_chart_skips_null_bars() {
        let response = json!({
            "chart": {
                "error": null,
                "result": [{
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {
                        "quote": [{
                            "open":   [10.0, null, 12.0],
                            "high":   [11.0, null, 13.0],
                            "low":    [ 9.0, null, 11.5],
                            "close":  [10.5, null, 12.5],
                            "volume": [1000, null, 3000]
                        }]
                    }
                }]
            }
        });

        let bars = parse_chart_response(&response, "AAPL").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[1].close, 12.5);
        assert_eq!(bars[0].symbol.as_deref(), Some("AAPL"));
        assert!(bars[0].time < bars[1].time);
    }

    #[test]
    fn test_parse_chart_reports_provider_error() {
        let response = json!({
            "chart": {
                "error": { "code": "Not Found", "description": "No data found" },
                "result": null
            }
        });
        match parse_chart_response(&response, "NOPE") {
            Err(ProviderError::InvalidResponse(msg)) => assert!(msg.contains("No data found")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_chart_length_mismatch() {
        let response = json!({
            "chart": {
                "error": null,
                "result": [{
                    "timestamp": [1700000000, 1700086400],
                    "indicators": {
                        "quote": [{
                            "open":   [10.0],
                            "high":   [11.0],
                            "low":    [9.0],
                            "close":  [10.5],
                            "volume": [1000]
                        }]
                    }
                }]
            }
        });
        assert!(matches!(
            parse_chart_response(&response, "AAPL"),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_quote_summary_fields() {
        let response = json!({
            "quoteSummary": {
                "error": null,
                "result": [{
                    "price": {
                        "longName": "Apple Inc.",
                        "exchangeName": "NasdaqGS",
                        "currency": "USD",
                        "regularMarketPrice": { "raw": 190.5, "fmt": "190.50" },
                        "regularMarketPreviousClose": { "raw": 188.0 },
                        "marketCap": { "raw": 2.9e12 }
                    },
                    "summaryDetail": {
                        "trailingPE": { "raw": 31.2 }
                    },
                    "assetProfile": {
                        "sector": "Technology",
                        "industry": "Consumer Electronics",
                        "website": "https://www.apple.com",
                        "longBusinessSummary": "Apple designs smartphones."
                    }
                }]
            }
        });

        let quote = parse_quote_summary(&response, "AAPL").unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.long_name.as_deref(), Some("Apple Inc."));
        assert_eq!(quote.current_price, Some(190.5));
        assert_eq!(quote.previous_close, Some(188.0));
        assert_eq!(quote.market_cap, Some(2.9e12));
        assert_eq!(quote.trailing_pe, Some(31.2));
        assert_eq!(quote.sector.as_deref(), Some("Technology"));
        assert_eq!(quote.day_change(), Some(2.5));
    }

    #[test]
    fn test_parse_quote_summary_absent_modules() {
        let response = json!({
            "quoteSummary": {
                "error": null,
                "result": [{
                    "price": { "regularMarketPrice": 42.0 }
                }]
            }
        });

        let quote = parse_quote_summary(&response, "XYZ").unwrap();
        assert_eq!(quote.current_price, Some(42.0));
        assert_eq!(quote.sector, None);
        assert_eq!(quote.trailing_pe, None);
        assert_eq!(quote.business_summary, None);
    }

    #[tokio::test]
    async fn test_shared_rate_limiter_below_limit_is_fast() {
        let limiter = SharedRateLimiter::new(10);
        let start = std::time::Instant::now();
        for _ in 0..5 {
            limiter.enforce_rate_limit().await;
        }
        assert!(start.elapsed() < StdDuration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cloned_clients_share_rate_limit_window() {
        let limiter = Arc::new(SharedRateLimiter::new(10));
        let client = YahooClient::with_shared_rate_limiter(false, 10, Some(limiter.clone()))
            .expect("client build");

        // Per-request clones must point at the same limiter, not a copy:
        // every clone's requests count against one sliding window
        let clone = client.clone();
        assert_eq!(Arc::strong_count(&limiter), 3);
        let cloned_limiter = clone.shared_rate_limiter.as_ref().expect("shared limiter");
        assert!(Arc::ptr_eq(&limiter, cloned_limiter));
    }
}
