use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";

    /// Convert a bar width in milliseconds to a yfinance-style shorthand (`1d`, `1h`, `1m`).
    pub fn interval_ms_to_string(interval_ms: i64) -> &'static str {
        match interval_ms {
            Self::MS_IN_MIN => "1m",
            Self::MS_IN_H => "1h",
            Self::MS_IN_D => "1d",
            _ => "unknown",
        }
    }
}

/// Parse a `YYYY-MM-DD` date as midnight UTC, in epoch milliseconds.
pub fn date_to_epoch_ms(date: &str) -> Result<i64> {
    let day = NaiveDate::parse_from_str(date, TimeUtils::STANDARD_TIME_FORMAT)
        .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", date))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Date {:?} has no midnight", date))?;
    Ok(midnight.and_utc().timestamp_millis())
}

pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    // Used for display purposes
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => format!("{}ms", epoch_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_as_utc_midnight() {
        assert_eq!(date_to_epoch_ms("1970-01-02").unwrap(), TimeUtils::MS_IN_D);
        assert_eq!(epoch_ms_to_utc(TimeUtils::MS_IN_D * 365), "1971-01-01");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(date_to_epoch_ms("2024/01/01").is_err());
        assert!(date_to_epoch_ms("2024-02-30").is_err());
    }

    #[test]
    fn interval_shorthand() {
        assert_eq!(TimeUtils::interval_ms_to_string(TimeUtils::MS_IN_H), "1h");
        assert_eq!(TimeUtils::interval_ms_to_string(42), "unknown");
    }
}
