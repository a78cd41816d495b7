//! Minute-resolution timestamps in the `YYYY.MM.DD.HH.MM` token layout.

use crate::error::{CsrfError, Result};
use crate::format::{TIME_FIELD_LEN, TIME_FIELD_SEPARATORS, TIME_SEPARATOR};
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

/// Byte ranges of year, month, day, hour and minute.
const GROUPS: [(usize, usize); 5] = [(0, 4), (5, 7), (8, 10), (11, 13), (14, 16)];

/// Encode `time` truncated to the minute.
pub fn format_minute(time: &DateTime<Utc>) -> Result<String> {
    let year = time.year();
    if !(1..=9999).contains(&year) {
        return Err(CsrfError::TimestampOutOfRange);
    }

    Ok(format!(
        "{:04}.{:02}.{:02}.{:02}.{:02}",
        year,
        time.month(),
        time.day(),
        time.hour(),
        time.minute()
    ))
}

/// Parse a time field, accepting only the exact `YYYY.MM.DD.HH.MM` grouping.
///
/// Returns `None` for anything else: wrong length, misplaced separators,
/// non-digit characters, or an impossible date or clock time.
pub fn parse_minute(field: &str) -> Option<DateTime<Utc>> {
    if field.len() != TIME_FIELD_LEN || field.matches(TIME_SEPARATOR).count() != TIME_FIELD_SEPARATORS {
        return None;
    }

    let mut values = [0u32; 5];
    for (value, &(start, end)) in values.iter_mut().zip(GROUPS.iter()) {
        let group = field.get(start..end)?;
        if !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *value = group.parse().ok()?;
    }

    // Separators must sit between the groups, not inside them.
    let bytes = field.as_bytes();
    if GROUPS.windows(2).any(|w| bytes[w[0].1] != TIME_SEPARATOR as u8) {
        return None;
    }

    let [year, month, day, hour, minute] = values;
    if year == 0 {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    Some(date.and_hms_opt(hour, minute, 0)?.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_truncates_seconds() {
        let time = Utc.with_ymd_and_hms(2018, 6, 17, 10, 43, 59).unwrap();
        assert_eq!(format_minute(&time).unwrap(), "2018.06.17.10.43");
    }

    #[test]
    fn test_format_pads_small_years() {
        let time = Utc.with_ymd_and_hms(987, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_minute(&time).unwrap(), "0987.01.02.03.04");
    }

    #[test]
    fn test_format_rejects_unencodable_years() {
        let time = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            format_minute(&time),
            Err(CsrfError::TimestampOutOfRange)
        ));

        let time = Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0).unwrap();
        assert!(format_minute(&time).is_err());
    }

    #[test]
    fn test_parse_round_trip() {
        let time = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 0).unwrap();
        let field = format_minute(&time).unwrap();
        assert_eq!(parse_minute(&field), Some(time));
    }

    #[test]
    fn test_format_drops_sub_second_precision() {
        let time = Utc.with_ymd_and_hms(2018, 6, 17, 10, 43, 8).unwrap()
            + chrono::Duration::microseconds(304_433);
        let field = format_minute(&time).unwrap();
        assert_eq!(field, "2018.06.17.10.43");
        assert_eq!(
            parse_minute(&field),
            Some(Utc.with_ymd_and_hms(2018, 6, 17, 10, 43, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_invalid_calendar_values() {
        assert_eq!(parse_minute("2018.13.17.10.43"), None);
        assert_eq!(parse_minute("2018.02.30.10.43"), None);
        assert_eq!(parse_minute("2023.02.29.10.43"), None);
        assert_eq!(parse_minute("2018.06.17.24.00"), None);
        assert_eq!(parse_minute("2018.06.17.10.60"), None);
        assert_eq!(parse_minute("0000.06.17.10.43"), None);
    }

    #[test]
    fn test_parse_rejects_bad_grouping() {
        assert_eq!(parse_minute("20181.6.17.10.43"), None);
        assert_eq!(parse_minute("2018.6.017.10.43"), None);
        assert_eq!(parse_minute("abcd.06.17.10.43"), None);
        assert_eq!(parse_minute("2018-06-17-10-43"), None);
        assert_eq!(parse_minute("2018.06.17.10.4"), None);
        assert_eq!(parse_minute("+018.06.17.10.43"), None);
        assert_eq!(parse_minute("2018.06.17.10.43."), None);
    }

    #[test]
    fn test_parse_rejects_non_ascii_without_panicking() {
        assert_eq!(parse_minute("2018.06.1².10.4"), None);
        assert_eq!(parse_minute("20¹8.06.17.10.4"), None);
    }
}
