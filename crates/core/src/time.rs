//! Instant parsing and calendar arithmetic for the simulated clock.
//!
//! Accepted inputs follow what the editor produces: RFC 3339 timestamps,
//! bare `YYYY-MM-DD` dates (UTC midnight), and offset-less date-times, which
//! are read in the server's local time zone.

use chrono::{DateTime, Days, Duration, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Bound on a single clock jump, roughly ten thousand years.
const MAX_SHIFT_MS: i64 = 10_000 * 366 * 86_400_000;

pub fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(input, fmt)
            .ok()
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            .map(|local| local.with_timezone(&Utc))
    })
}

/// ISO-8601 UTC with millisecond precision, e.g. `2025-08-20T00:00:00.000Z`.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn add_hours(instant: DateTime<Utc>, hours: i64) -> Option<DateTime<Utc>> {
    let ms = hours.checked_mul(3_600_000).filter(|ms| ms.abs() <= MAX_SHIFT_MS)?;
    instant.checked_add_signed(Duration::milliseconds(ms))
}

/// Adds calendar days in local time, so wall-clock time survives DST changes.
pub fn add_days(instant: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    if days.checked_mul(86_400_000)?.abs() > MAX_SHIFT_MS {
        return None;
    }
    let local = instant.with_timezone(&Local);
    let shifted = if days >= 0 {
        local.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        local.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| instant.checked_add_signed(Duration::milliseconds(days * 86_400_000)))
}

/// Minutes since local midnight.
pub fn local_minute_of_day(instant: &DateTime<Utc>) -> u32 {
    let local = instant.with_timezone(&Local);
    local.hour() * 60 + local.minute()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_and_dates() {
        let a = parse_instant("2025-08-20T00:00:00Z").unwrap();
        let b = parse_instant("2025-08-20T00:00:00.000Z").unwrap();
        let c = parse_instant("2025-08-20").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(
            parse_instant("2025-08-20T02:00:00+02:00").unwrap(),
            a
        );
    }

    #[test]
    fn test_parse_naive_is_local() {
        let parsed = parse_instant("2025-08-20T09:30").unwrap();
        let expected = Local
            .with_ymd_and_hms(2025, 8, 20, 9, 30, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_instant("").is_none());
        assert!(parse_instant("not a date").is_none());
        assert!(parse_instant("2025-13-45").is_none());
    }

    #[test]
    fn test_format_instant_uses_millis_and_z() {
        let t = parse_instant("2025-08-20T00:00:00Z").unwrap();
        assert_eq!(format_instant(&t), "2025-08-20T00:00:00.000Z");
    }

    #[test]
    fn test_add_hours() {
        let t = parse_instant("2025-08-20T22:00:00Z").unwrap();
        assert_eq!(
            format_instant(&add_hours(t, 5).unwrap()),
            "2025-08-21T03:00:00.000Z"
        );
        assert!(add_hours(t, i64::MAX).is_none());
    }

    #[test]
    fn test_add_days_keeps_local_wall_clock() {
        let start = Local
            .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        let later = add_days(start, 60).unwrap().with_timezone(&Local);
        assert_eq!(later.hour(), 12);
        assert_eq!(later.date_naive(), NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());

        let back = add_days(start, -1).unwrap().with_timezone(&Local);
        assert_eq!(back.date_naive(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert!(add_days(start, i64::MAX).is_none());
    }

    #[test]
    fn test_local_minute_of_day() {
        let t = Local
            .with_ymd_and_hms(2025, 8, 20, 14, 45, 10)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(local_minute_of_day(&t), 14 * 60 + 45);
    }
}
