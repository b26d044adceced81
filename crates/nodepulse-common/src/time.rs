// ============================================
// File: crates/nodepulse-common/src/time.rs
// ============================================
//! # Time Utilities
//!
//! ## Creation Reason
//! The remote service speaks ISO-8601 (`2024-01-01T00:00:00.000Z`) and
//! the reports show ages and uptimes as `"{h}h {m}m {s}s"`. Both conversions
//! live here so the client and the agent agree on them.
//!
//! ## Main Functionality
//! - `iso_timestamp`: JavaScript-style `toISOString()` rendering
//! - `parse_timestamp`: RFC 3339 parsing into UTC
//! - `whole_seconds_between`: floor of elapsed seconds, clamped at zero
//! - `format_duration`: human-readable `h/m/s` rendering
//!
//! ## Last Modified
//! v0.1.0 - Initial time utilities

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{CommonError, Result};

/// Renders `at` with millisecond precision and a `Z` suffix.
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 / ISO-8601 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CommonError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Whole seconds from `earlier` to `later`.
///
/// Returns zero when `earlier` is in the future (clock skew between us
/// and the remote).
#[must_use]
pub fn whole_seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> u64 {
    u64::try_from((later - earlier).num_seconds()).unwrap_or(0)
}

/// Formats a duration as `"{h}h {m}m {s}s"`, ignoring sub-second parts.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    format_secs(duration.as_secs())
}

/// Formats whole seconds as `"{h}h {m}m {s}s"`.
#[must_use]
pub fn format_secs(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}h {minutes}m {secs}s")
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(iso_timestamp(at), "2024-03-09T07:05:01.000Z");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let zulu = parse_timestamp("2024-03-09T07:05:01.250Z").unwrap();
        let offset = parse_timestamp("2024-03-09T09:05:01.250+02:00").unwrap();
        assert_eq!(zulu, offset);

        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(CommonError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_whole_seconds_floor() {
        let t0 = parse_timestamp("2024-03-09T07:00:00.000Z").unwrap();
        let later = parse_timestamp("2024-03-09T08:01:01.999Z").unwrap();
        assert_eq!(whole_seconds_between(t0, later), 3661);
    }

    #[test]
    fn test_whole_seconds_clamped_on_skew() {
        let t0 = parse_timestamp("2024-03-09T07:00:10.000Z").unwrap();
        let now = parse_timestamp("2024-03-09T07:00:00.000Z").unwrap();
        assert_eq!(whole_seconds_between(t0, now), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_secs(0), "0h 0m 0s");
        assert_eq!(format_secs(3661), "1h 1m 1s");
        assert_eq!(format_duration(Duration::from_millis(90_500)), "0h 1m 30s");
        assert_eq!(format_secs(26 * 3600), "26h 0m 0s");
    }
}
