//! Date parsing and formatting helpers.
//!
//! Every date that crosses the wire goes through here. Calendar dates are
//! always derived in UTC so a bucket key never depends on the machine's
//! local timezone.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::error::{CoreError, CoreResult};

/// Datetime layouts accepted when the backend omits the UTC offset.
const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parsed form of a wire date: either an instant or a whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Instant(DateTime<Utc>),
    Day(NaiveDate),
}

/// Parse an ISO 8601 datetime (with or without offset) or a plain `YYYY-MM-DD`.
///
/// Datetimes without an offset are taken as UTC.
pub fn parse_iso(input: &str) -> CoreResult<ParsedDate> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(ParsedDate::Instant(dt.with_timezone(&Utc)));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ParsedDate::Instant(naive.and_utc()));
        }
    }

    parse_day(s).map(ParsedDate::Day)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_day(input: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(input.to_string()))
}

/// Parse either form and reduce it to its UTC calendar date.
pub fn parse_to_day(input: &str) -> CoreResult<NaiveDate> {
    Ok(match parse_iso(input)? {
        ParsedDate::Instant(dt) => dt.date_naive(),
        ParsedDate::Day(d) => d,
    })
}

/// Bucket key for a calendar date, built from its components.
pub fn date_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Serde adapter for optional calendar dates that the backend may send as
/// either `YYYY-MM-DD` or a full datetime (e.g. `2015-06-01T00:00:00.000Z`).
pub mod optional_day {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_str(&super::date_key(*d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse_to_day(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_zulu() {
        let parsed = parse_iso("2025-03-05T10:00:00Z").unwrap();
        assert_eq!(
            parsed,
            ParsedDate::Instant(Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn parses_offset_into_utc_day() {
        // 23:30 at -05:00 is already the next day in UTC
        let day = parse_to_day("2025-03-05T23:30:00-05:00").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2025, 3, 6).unwrap());
    }

    #[test]
    fn parses_fractional_seconds() {
        let day = parse_to_day("2015-06-01T00:00:00.000Z").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2015, 6, 1).unwrap());
    }

    #[test]
    fn naive_datetime_is_utc() {
        let parsed = parse_iso("2025-03-05T10:00").unwrap();
        assert_eq!(
            parsed,
            ParsedDate::Instant(Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn plain_date_stays_a_day() {
        let parsed = parse_iso("2025-03-05").unwrap();
        assert_eq!(
            parsed,
            ParsedDate::Day(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(parse_iso("Invalid Date"), Err(CoreError::InvalidDate(_))));
        assert!(matches!(parse_iso(""), Err(CoreError::InvalidDate(_))));
        assert!(matches!(parse_iso("2025-02-30"), Err(CoreError::InvalidDate(_))));
    }

    #[test]
    fn date_key_is_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(date_key(d), "2025-03-05");
    }
}
