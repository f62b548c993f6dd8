//! Vendor timestamp normalization.
//!
//! Chromium-family history stores record visit times as microseconds since
//! 1601-01-01 (the Windows FILETIME epoch at microsecond resolution).

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Seconds between 1601-01-01 and the Unix epoch.
const WINDOWS_EPOCH_OFFSET_SECS: f64 = 11_644_473_600.0;

/// Convert a raw vendor timestamp into a localized instant.
///
/// Returns `None` for non-numeric input, a raw value of exactly zero
/// ("never visited"), and values outside the representable range. Never
/// panics or errors on any input string.
pub fn normalize(raw: &str, zone: Tz) -> Option<DateTime<Tz>> {
    let value: f64 = raw.trim().parse().ok()?;
    if value == 0.0 {
        return None;
    }
    let unix_secs = value / 1_000_000.0 - WINDOWS_EPOCH_OFFSET_SECS;
    if !unix_secs.is_finite() {
        return None;
    }
    let secs = unix_secs.floor();
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    let nanos = ((unix_secs - secs) * 1_000_000_000.0) as u32;
    let utc = DateTime::<Utc>::from_timestamp(secs as i64, nanos)?;
    Some(utc.with_timezone(&zone))
}

#[cfg(test)]
mod tests {
    use super::normalize;
    use crate::engine::local_zone;
    use chrono::{TimeZone, Utc};

    #[test]
    fn converts_chromium_epoch_to_utc_instant() {
        // 2022-10-14T00:00:00Z in microseconds since 1601-01-01.
        let dt = normalize("13310179200000000", local_zone()).expect("instant");
        let expected = Utc.with_ymd_and_hms(2022, 10, 14, 0, 0, 0).unwrap();
        let delta = (dt.with_timezone(&Utc) - expected).num_seconds().abs();
        assert!(delta <= 1, "off by {delta}s");
    }

    #[test]
    fn localizes_to_eastern_australia() {
        // Sydney is on AEDT (UTC+11) in mid-October.
        let dt = normalize("13310179200000000", local_zone()).expect("instant");
        assert_eq!(dt.to_rfc3339(), "2022-10-14T11:00:00+11:00");
    }

    #[test]
    fn zero_means_never_visited() {
        assert!(normalize("0", local_zone()).is_none());
        assert!(normalize("0.0", local_zone()).is_none());
    }

    #[test]
    fn rejects_non_numeric_and_out_of_range() {
        assert!(normalize("", local_zone()).is_none());
        assert!(normalize("not a number", local_zone()).is_none());
        assert!(normalize("nan", local_zone()).is_none());
        assert!(normalize("inf", local_zone()).is_none());
        assert!(normalize("1e300", local_zone()).is_none());
    }

    #[test]
    fn accepts_fractional_microseconds() {
        assert!(normalize("13310179200000000.5", local_zone()).is_some());
    }
}
