//! Epoch-millisecond timestamp helpers
//!
//! Tracking servers store times as UTC epoch milliseconds. Manifests carry a
//! human readable copy next to the raw value.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format epoch millis as `YYYY-MM-DD HH:MM:SS` (UTC)
///
/// ```
/// use mlmigrate::core::timestamp::fmt_ts_millis;
///
/// assert_eq!(fmt_ts_millis(1_700_000_000_000), "2023-11-14 22:13:20");
/// ```
pub fn fmt_ts_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Current time in epoch millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a UTC date or datetime into epoch millis
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and
/// RFC 3339 with an offset.
pub fn parse_utc_millis(input: &str) -> Result<i64, String> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .ok_or_else(|| format!("invalid date '{input}'"));
    }

    for format in [DISPLAY_FORMAT, "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| {
            format!(
                "invalid time '{input}', expected YYYY-MM-DD, 'YYYY-MM-DD HH:MM:SS' or RFC 3339"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2023-11-14", 1_699_920_000_000 ; "date only")]
    #[test_case("2023-11-14 22:13:20", 1_700_000_000_000 ; "space separated")]
    #[test_case("2023-11-14T22:13:20", 1_700_000_000_000 ; "t separated")]
    #[test_case("2023-11-14T23:13:20+01:00", 1_700_000_000_000 ; "rfc3339 offset")]
    fn test_parse_utc_millis(input: &str, expected: i64) {
        assert_eq!(parse_utc_millis(input), Ok(expected));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_utc_millis("yesterday").is_err());
        assert!(parse_utc_millis("2023-13-40").is_err());
    }

    #[test]
    fn test_format_round_trips_display_form() {
        let millis = parse_utc_millis("2024-02-29 08:30:00").unwrap();
        assert_eq!(fmt_ts_millis(millis), "2024-02-29 08:30:00");
    }
}
