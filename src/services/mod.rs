pub mod cache;
pub mod forecast;
pub mod market_hours;
pub mod portfolio;
pub mod provider;
pub mod screener;
pub mod sentiment;

pub use cache::ResponseCache;
pub use forecast::{fit_forecast, forecast_symbol};
pub use portfolio::{summarize, PortfolioBook, SharedPortfolioBook};
pub use provider::{ProviderError, SharedRateLimiter, YahooClient};
pub use screener::{parse_symbols, run_screener};
pub use sentiment::{classify, classify_polarity, polarity, Sentiment};
