mod forecast;
mod interval;
mod ohlcv;
mod portfolio;
mod quote;
mod screener;

pub use forecast::{Forecast, ForecastPoint};
pub use interval::Interval;
pub use ohlcv::Ohlcv;
pub use portfolio::{PortfolioRow, PortfolioSummary, Position};
pub use quote::Quote;
pub use screener::{ScreenerReport, ScreenerRow};
