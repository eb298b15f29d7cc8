//! Crate-wide defaults and tuning knobs.

/// Sentiment classification thresholds on the polarity scale [-1, 1].
///
/// Strictly above the positive threshold -> Positive.
/// Strictly below the negative threshold -> Negative.
/// Everything else (including exactly on a threshold) -> Neutral.
pub const SENTIMENT_POSITIVE_THRESHOLD: f64 = 0.1;
pub const SENTIMENT_NEGATIVE_THRESHOLD: f64 = -0.1;

/// Historical range fetched for the quote view.
pub const QUOTE_HISTORY_RANGE: &str = "6mo";

/// Intraday range fetched for the quote view (5-minute bars).
pub const INTRADAY_RANGE: &str = "1d";

/// Training range for the forecast model.
pub const FORECAST_HISTORY_RANGE: &str = "2y";

/// Days predicted past the end of the training data.
pub const FORECAST_HORIZON_DAYS: usize = 30;

/// Minimum daily bars required before a forecast is attempted.
pub const FORECAST_MIN_HISTORY: usize = 30;

/// TTL for memoized quote/screener/forecast responses.
pub const RESPONSE_CACHE_TTL_SECONDS: i64 = 300;

/// Provider rate limit (requests per minute, sliding window).
pub const PROVIDER_RATE_LIMIT_PER_MINUTE: u32 = 30;

/// Default HTTP port for the API server.
pub const DEFAULT_PORT: u16 = 9876;

/// Default symbol used by `status` and as a placeholder in docs.
pub const DEFAULT_SYMBOL: &str = "AAPL";

/// Default screener watchlist when none is supplied.
pub const DEFAULT_SCREENER_SYMBOLS: &str = "AAPL, TSLA, MSFT, AMZN, GOOGL";
