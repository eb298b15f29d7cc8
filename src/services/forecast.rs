use chrono::Duration;
use tracing::debug;

use crate::constants::{FORECAST_HISTORY_RANGE, FORECAST_HORIZON_DAYS, FORECAST_MIN_HISTORY};
use crate::error::{AppError, Result};
use crate::models::{Forecast, ForecastPoint, Interval, Ohlcv};
use crate::services::provider::YahooClient;

/// Level smoothing factor (weight of the newest observation)
pub const SMOOTHING_LEVEL: f64 = 0.5;
/// Trend smoothing factor
pub const SMOOTHING_TREND: f64 = 0.3;
/// z-score for the ~95% confidence band
pub const CONFIDENCE_Z: f64 = 1.96;

/// Fit Holt's linear-trend exponential smoothing on daily closes and
/// extend it `horizon_days` past the last observation.
///
/// The returned series covers the fitted history followed by the future
/// horizon. Bands are Gaussian from the one-step residual deviation and
/// widen with the square root of the horizon distance.
pub fn fit_forecast(symbol: &str, bars: &[Ohlcv], horizon_days: usize) -> Result<Forecast> {
    if bars.len() < FORECAST_MIN_HISTORY {
        return Err(AppError::InsufficientHistory(format!(
            "{}: {} daily bars, need at least {}",
            symbol,
            bars.len(),
            FORECAST_MIN_HISTORY
        )));
    }

    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    let n = closes.len();

    let mut level = closes[0];
    let mut trend = closes[1] - closes[0];

    let mut fitted = Vec::with_capacity(n);
    fitted.push(closes[0]);

    let mut squared_residuals = 0.0;
    for &observed in &closes[1..] {
        let predicted = level + trend;
        fitted.push(predicted);
        squared_residuals += (observed - predicted) * (observed - predicted);

        let previous_level = level;
        level = SMOOTHING_LEVEL * observed + (1.0 - SMOOTHING_LEVEL) * (level + trend);
        trend = SMOOTHING_TREND * (level - previous_level) + (1.0 - SMOOTHING_TREND) * trend;
    }

    let sigma = (squared_residuals / (n - 1) as f64).sqrt();
    debug!(
        symbol,
        bars = n,
        sigma,
        level,
        trend,
        "Fitted linear-trend model"
    );

    let mut points = Vec::with_capacity(n + horizon_days);
    for (bar, predicted) in bars.iter().zip(&fitted) {
        points.push(ForecastPoint {
            time: bar.time,
            predicted: *predicted,
            lower: predicted - CONFIDENCE_Z * sigma,
            upper: predicted + CONFIDENCE_Z * sigma,
        });
    }

    let last_time = bars[n - 1].time;
    for step in 1..=horizon_days {
        let predicted = level + step as f64 * trend;
        let spread = CONFIDENCE_Z * sigma * (step as f64).sqrt();
        points.push(ForecastPoint {
            time: last_time + Duration::days(step as i64),
            predicted,
            lower: predicted - spread,
            upper: predicted + spread,
        });
    }

    Ok(Forecast {
        symbol: symbol.to_uppercase(),
        points,
        trained_on: n,
        horizon_days,
    })
}

/// Fetch 2 years of daily closes and forecast 30 days forward
pub async fn forecast_symbol(client: &mut YahooClient, symbol: &str) -> Result<Forecast> {
    let bars = client
        .history(symbol, Interval::Daily, FORECAST_HISTORY_RANGE)
        .await?;
    fit_forecast(symbol, &bars, FORECAST_HORIZON_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn daily_bars(closes: &[f64]) -> Vec<Ohlcv> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                Ohlcv::new(
                    t0 + Duration::days(i as i64),
                    close,
                    close,
                    close,
                    close,
                    1_000,
                )
            })
            .collect()
    }

    #[test]
    fn test_too_short_history_is_rejected() {
        let bars = daily_bars(&[1.0; 10]);
        assert!(matches!(
            fit_forecast("AAPL", &bars, 30),
            Err(AppError::InsufficientHistory(_))
        ));
    }

    #[test]
    fn test_linear_series_is_extrapolated_exactly() {
        // y = 5 + 2t: level/trend track a clean linear series without error
        let closes: Vec<f64> = (0..60).map(|t| 5.0 + 2.0 * t as f64).collect();
        let bars = daily_bars(&closes);

        let forecast = fit_forecast("lin", &bars, 10).unwrap();
        assert_eq!(forecast.symbol, "LIN");
        assert_eq!(forecast.trained_on, 60);
        assert_eq!(forecast.points.len(), 70);

        // Fitted values reproduce the observations
        for (point, &close) in forecast.fitted().iter().zip(&closes) {
            assert!((point.predicted - close).abs() < 1e-9);
        }

        // Future points continue the line with zero-width bands
        let last = *closes.last().unwrap();
        for (step, point) in forecast.future().iter().enumerate() {
            let expected = last + 2.0 * (step as f64 + 1.0);
            assert!((point.predicted - expected).abs() < 1e-9);
            assert!((point.upper - point.lower).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bands_widen_with_horizon() {
        // Noisy series: alternating offsets create nonzero residuals
        let closes: Vec<f64> = (0..60)
            .map(|t| 100.0 + t as f64 + if t % 2 == 0 { 1.5 } else { -1.5 })
            .collect();
        let bars = daily_bars(&closes);

        let forecast = fit_forecast("NOISY", &bars, 10).unwrap();
        let future = forecast.future();

        let first_spread = future[0].upper - future[0].lower;
        let last_spread = future[9].upper - future[9].lower;
        assert!(first_spread > 0.0);
        assert!(last_spread > first_spread);

        // Point estimate sits midway in the band
        for point in future {
            let mid = (point.upper + point.lower) / 2.0;
            assert!((mid - point.predicted).abs() < 1e-9);
        }
    }

    #[test]
    fn test_future_timestamps_are_consecutive_days() {
        let closes: Vec<f64> = (0..40).map(|t| 50.0 + t as f64).collect();
        let bars = daily_bars(&closes);
        let last_time = bars.last().unwrap().time;

        let forecast = fit_forecast("AAPL", &bars, 5).unwrap();
        for (step, point) in forecast.future().iter().enumerate() {
            assert_eq!(point.time, last_time + Duration::days(step as i64 + 1));
        }
    }
}
