//! Display formatting for scores, percentages and timestamps.

use chrono::{DateTime, TimeZone};
use tracing::instrument;

/// Formats a score delta with an explicit sign for gains (`+50`, `-30`, `0`).
#[instrument]
pub fn format_score(score: i64) -> String {
    if score > 0 {
        format!("+{}", score)
    } else {
        score.to_string()
    }
}

/// Formats an integer with thousands separators (`-1,234,567`).
#[instrument]
pub fn format_number(num: i64) -> String {
    let digits = num.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if num < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats a 0.0 to 1.0 ratio as a percentage with `decimals` places.
#[instrument]
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// Formats a millisecond timestamp as `YYYY/MM/DD HH:MM` in `tz`.
///
/// Out-of-range timestamps format as an empty string.
pub fn format_date_time<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.with_timezone(tz).format("%Y/%m/%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Formats a millisecond timestamp as `YYYY/MM/DD` in `tz`.
pub fn format_date<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.with_timezone(tz).format("%Y/%m/%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_score_signs() {
        assert_eq!(format_score(50), "+50");
        assert_eq!(format_score(-30), "-30");
        assert_eq!(format_score(0), "0");
    }

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(-1234567), "-1,234,567");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.5, 1), "50.0%");
        assert_eq!(format_percentage(0.3333, 0), "33%");
    }

    #[test]
    fn test_format_date_time_utc() {
        assert_eq!(format_date_time(1_700_000_000_000, &Utc), "2023/11/14 22:13");
        assert_eq!(format_date(1_700_000_000_000, &Utc), "2023/11/14");
    }
}
