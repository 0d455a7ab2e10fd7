// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a duration in seconds as `m:ss`, as shown on the live walk screen.
pub fn format_clock(duration_s: u64) -> String {
    format!("{}:{:02}", duration_s / 60, duration_s % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_utc_rfc3339_uses_z_suffix() {
        let date = DateTime::parse_from_rfc3339("2025-06-01T14:03:09.250+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_utc_rfc3339(date), "2025-06-01T14:03:09Z");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(3_600), "60:00");
    }
}
