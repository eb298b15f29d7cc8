use chrono::{Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Trading hours configuration for the US equity session
pub struct MarketHours {
    pub open_hour: u32,
    pub open_minute: u32,
    pub close_hour: u32,
    pub timezone: &'static str,
    pub weekdays_only: bool,
}

impl Default for MarketHours {
    fn default() -> Self {
        Self {
            open_hour: 9,
            open_minute: 30, // 9:30 AM ET
            close_hour: 16,  // 4:00 PM ET
            timezone: "America/New_York",
            weekdays_only: true,
        }
    }
}

/// Check if the US market is currently in its regular session.
/// Exchange holidays are not modelled; a holiday reads as open.
pub fn is_market_open() -> bool {
    let config = MarketHours::default();

    let tz: Tz = match config.timezone.parse() {
        Ok(tz) => tz,
        Err(e) => {
            tracing::warn!("Failed to parse timezone '{}': {}", config.timezone, e);
            return false;
        }
    };

    let now_local = Utc::now().with_timezone(&tz);

    if config.weekdays_only {
        match now_local.weekday() {
            Weekday::Sat | Weekday::Sun => return false,
            _ => {}
        }
    }

    let hour = now_local.hour();
    let minute = now_local.minute();

    let after_open = hour > config.open_hour
        || (hour == config.open_hour && minute >= config.open_minute);
    after_open && hour < config.close_hour
}

/// Cache-Control max-age for API responses.
///
/// During the session quotes move constantly, so clients should refetch
/// quickly; off-hours the data is static until the next open.
pub fn get_cache_max_age() -> u32 {
    if is_market_open() {
        30
    } else {
        300
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_hours_config() {
        let config = MarketHours::default();
        assert_eq!(config.open_hour, 9);
        assert_eq!(config.open_minute, 30);
        assert_eq!(config.close_hour, 16);
        assert_eq!(config.timezone, "America/New_York");
        assert!(config.weekdays_only);
    }

    #[test]
    fn test_cache_max_age_is_bounded() {
        let age = get_cache_max_age();
        assert!(age == 30 || age == 300);
    }
}
