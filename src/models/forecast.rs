use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single forecasted value with its confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
    /// Point estimate
    pub predicted: f64,
    /// Lower confidence bound
    pub lower: f64,
    /// Upper confidence bound
    pub upper: f64,
}

/// Fitted-plus-future forecast series for one symbol.
///
/// `points[..trained_on]` cover the fitted history, `points[trained_on..]`
/// the future horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub symbol: String,
    pub points: Vec<ForecastPoint>,
    /// Number of leading points that correspond to training data
    pub trained_on: usize,
    /// Days predicted past the last observation
    pub horizon_days: usize,
}

impl Forecast {
    /// The future slice of the series (past the training window)
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.trained_on.min(self.points.len())..]
    }

    /// The fitted slice of the series (within the training window)
    pub fn fitted(&self) -> &[ForecastPoint] {
        &self.points[..self.trained_on.min(self.points.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_future_and_fitted_split() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let points: Vec<ForecastPoint> = (0..5)
            .map(|i| ForecastPoint {
                time: t0 + chrono::Duration::days(i),
                predicted: i as f64,
                lower: i as f64 - 1.0,
                upper: i as f64 + 1.0,
            })
            .collect();

        let forecast = Forecast {
            symbol: "AAPL".to_string(),
            points,
            trained_on: 3,
            horizon_days: 2,
        };

        assert_eq!(forecast.fitted().len(), 3);
        assert_eq!(forecast.future().len(), 2);
        assert_eq!(forecast.future()[0].predicted, 3.0);
    }
}
