//! # ISO and DOY time string handling
//!
//! Parsing and formatting of the two earth-time text representations used by
//! the ground system: ISO (`YYYY-MM-DDTHH:MM:SS.fff`) and day-of-year
//! (`YYYY-DDDTHH:MM:SS.fff`). All numeric earth times in this crate are
//! milliseconds since the Unix epoch, UTC; this module is the only place where
//! text representations are turned into those milliseconds and back.
//!
//! The epoch bridge between Unix seconds and the J2000-based spacecraft clock
//! time base ([`unix_to_j2000`], [`j2000_to_unix`]) also lives here.

use hifitime::Epoch;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::J2000_UNIX_SECONDS;
use crate::sclkscet_errors::{FormatError, SclkScetError};

/// An ISO formatted time `YYYY-MM-DDTHH:mm:ss` (the `T` may be a space),
/// with optional subseconds.
static ISO_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}[T ][0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?$").unwrap());

/// A DOY formatted time `YYYY-DDDTHH:mm:ss` (the `T` may be a space),
/// with optional subseconds.
static DOY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{3}[T ][0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?$").unwrap());

/// Convert a number of seconds since the Unix epoch to the J2000-based
/// spacecraft clock time base.
pub fn unix_to_j2000(seconds: f64) -> f64 {
    seconds - J2000_UNIX_SECONDS
}

/// Convert a J2000-based spacecraft clock time to seconds since the Unix epoch.
pub fn j2000_to_unix(seconds: f64) -> f64 {
    seconds + J2000_UNIX_SECONDS
}

/// Take a string representing an ISO or a DOY formatted time and return the
/// number of milliseconds since the Unix epoch that it represents.
///
/// Arguments
/// ---------
/// * `time_string`: an ISO (`YYYY-MM-DDTHH:MM:SS[.fff]`) or DOY
///   (`YYYY-DDDTHH:MM:SS[.fff]`) time, or a pure-digit millisecond count.
///   The `T` separator may be a space.
///
/// Return
/// ------
/// * Milliseconds since the Unix epoch (UTC), or a
///   [`FormatError::InvalidTimeString`] if the string matches neither shape.
///
/// Subsecond digits beyond the millisecond are truncated; missing subsecond
/// digits are zero-filled.
pub fn parse_time_string(time_string: &str) -> Result<i64, SclkScetError> {
    let trimmed = time_string.trim();

    let (stem, subsec_ms) = match trimmed.split_once('.') {
        Some((stem, subseconds)) => {
            if subseconds.is_empty() || !subseconds.bytes().all(|b| b.is_ascii_digit()) {
                return Err(FormatError::InvalidTimeString(time_string.to_string()).into());
            }
            let mut digits = subseconds.to_string();
            digits.truncate(3);
            while digits.len() < 3 {
                digits.push('0');
            }
            // cannot fail, three ascii digits
            (stem.trim(), digits.parse::<i64>().unwrap_or(0))
        }
        None => (trimmed, 0),
    };

    if ISO_REGEX.is_match(stem) {
        let year = parse_field(stem, 0..4, time_string)?;
        let month = parse_field(stem, 5..7, time_string)? as u8;
        let day = parse_field(stem, 8..10, time_string)? as u8;
        let (hour, minute, second) = parse_time_of_day(stem, 11, time_string)?;
        Ok(epoch_millis(year, month, day, hour, minute, second, time_string)? + subsec_ms)
    } else if DOY_REGEX.is_match(stem) {
        let year = parse_field(stem, 0..4, time_string)?;
        let doy = parse_field(stem, 5..8, time_string)? as u16;
        let (month, day) = month_day_from_doy(year, doy)
            .ok_or_else(|| FormatError::InvalidTimeString(time_string.to_string()))?;
        let (hour, minute, second) = parse_time_of_day(stem, 9, time_string)?;
        Ok(epoch_millis(year, month, day, hour, minute, second, time_string)? + subsec_ms)
    } else if !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()) {
        stem.parse::<i64>()
            .map_err(|_| FormatError::InvalidTimeString(time_string.to_string()).into())
    } else {
        Err(FormatError::InvalidTimeString(time_string.to_string()).into())
    }
}

fn parse_field(
    stem: &str,
    range: std::ops::Range<usize>,
    original: &str,
) -> Result<i32, SclkScetError> {
    stem.get(range)
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(|| FormatError::InvalidTimeString(original.to_string()).into())
}

fn parse_time_of_day(
    stem: &str,
    offset: usize,
    original: &str,
) -> Result<(u8, u8, u8), SclkScetError> {
    let hour = parse_field(stem, offset..offset + 2, original)? as u8;
    let minute = parse_field(stem, offset + 3..offset + 5, original)? as u8;
    let second = parse_field(stem, offset + 6..offset + 8, original)? as u8;
    Ok((hour, minute, second))
}

fn epoch_millis(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    original: &str,
) -> Result<i64, SclkScetError> {
    let epoch =
        Epoch::maybe_from_gregorian_utc(year, month, day, hour, minute, second, 0)
            .map_err(|_| FormatError::InvalidTimeString(original.to_string()))?;
    Ok(epoch.to_unix_milliseconds().round() as i64)
}

/// Take the input milliseconds since the Unix epoch and convert them to a
/// formatted time string.
///
/// Arguments
/// ---------
/// * `ms`: milliseconds since the Unix epoch.
/// * `use_doy`: emit `YYYY-DDD` instead of `YYYY-MM-DD`.
/// * `precision`: number of subsecond digits, clamped to `0..=9` (values above
///   9 fall back to 3). Digits past the millisecond are zero-filled.
///
/// Return
/// ------
/// * The formatted timestamp string.
pub fn format_scet(ms: i64, use_doy: bool, precision: u32) -> String {
    let precision = if precision > 9 { 3 } else { precision } as usize;

    let seconds = ms.div_euclid(1000);
    let millis = ms.rem_euclid(1000);

    let epoch = Epoch::from_unix_seconds(seconds as f64);
    let (year, month, day, hour, minute, second, _) = epoch.to_gregorian_utc();

    let stem = if use_doy {
        let doy = doy_from_month_day(year, month, day);
        format!("{year:04}-{doy:03}T{hour:02}:{minute:02}:{second:02}")
    } else {
        format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}")
    };

    if precision == 0 {
        return stem;
    }

    let mut subsecs = format!("{millis:03}");
    while subsecs.len() < precision {
        subsecs.push('0');
    }
    subsecs.truncate(precision);

    format!("{stem}.{subsecs}")
}

/// Format a sub-day second count as `HH:MM:SS` plus subsecond digits.
///
/// Arguments
/// ---------
/// * `seconds`: number of seconds to convert; values over 24 hours wrap.
/// * `precision`: number of subsecond digits (values above 9 fall back to 3).
///
/// The subseconds are rounded to `precision` digits, with carry into the
/// seconds when the rounded value reaches one.
pub fn format_hms(seconds: f64, precision: u32) -> String {
    let precision = if precision > 9 { 3 } else { precision };

    let mut whole = seconds.trunc();
    let scale = 10f64.powi(precision as i32);
    let mut subsecs = (seconds.fract() * scale).round();
    if subsecs >= scale {
        whole += 1.0;
        subsecs = 0.0;
    }

    let total = whole as u64;
    let hour = (total / 3600) % 24;
    let minute = (total % 3600) / 60;
    let second = total % 60;

    if precision == 0 {
        format!("{hour:02}:{minute:02}:{second:02}")
    } else {
        format!(
            "{hour:02}:{minute:02}:{second:02}.{:0width$}",
            subsecs as u64,
            width = precision as usize
        )
    }
}

/// Reformat a DOY time string (`YYYY-DDDT...`) as an ISO time string
/// (`YYYY-MM-DDT...`), leaving the time-of-day suffix untouched.
pub fn doy_to_iso(doy_string: &str) -> Result<String, SclkScetError> {
    let (date, time_suffix) = doy_string
        .split_once('T')
        .ok_or_else(|| FormatError::InvalidTimeString(doy_string.to_string()))?;

    let (year_str, doy_str) = date
        .split_once('-')
        .ok_or_else(|| FormatError::InvalidTimeString(doy_string.to_string()))?;

    let year: i32 = year_str
        .parse()
        .map_err(|_| FormatError::InvalidTimeString(doy_string.to_string()))?;
    let doy: u16 = doy_str
        .parse()
        .map_err(|_| FormatError::InvalidTimeString(doy_string.to_string()))?;

    let (month, day) = month_day_from_doy(year, doy)
        .ok_or_else(|| FormatError::InvalidTimeString(doy_string.to_string()))?;

    Ok(format!("{year:04}-{month:02}-{day:02}T{time_suffix}"))
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn month_lengths(year: i32) -> [u16; 12] {
    let february = if is_leap_year(year) { 29 } else { 28 };
    [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
}

/// Expand a 1-based day-of-year into a (month, day) pair, or `None` when the
/// day number is outside the year.
fn month_day_from_doy(year: i32, doy: u16) -> Option<(u8, u8)> {
    if doy == 0 {
        return None;
    }
    let mut remaining = doy;
    for (index, length) in month_lengths(year).iter().enumerate() {
        if remaining <= *length {
            return Some((index as u8 + 1, remaining as u8));
        }
        remaining -= length;
    }
    None
}

/// 1-based day-of-year of a calendar date.
fn doy_from_month_day(year: i32, month: u8, day: u8) -> u16 {
    let lengths = month_lengths(year);
    let prior: u16 = lengths[..(month as usize - 1)].iter().sum();
    prior + day as u16
}

#[cfg(test)]
mod time_format_test {
    use super::*;

    #[test]
    fn test_parse_iso() {
        let ms = parse_time_string("2012-01-01T00:00:00").unwrap();
        assert_eq!(ms, 1_325_376_000_000);

        let ms = parse_time_string("2012-01-01 00:00:00.5").unwrap();
        assert_eq!(ms, 1_325_376_000_500);
    }

    #[test]
    fn test_parse_doy() {
        let ms = parse_time_string("2012-001T00:00:00.000").unwrap();
        assert_eq!(ms, 1_325_376_000_000);

        // 2000 is a leap year, so DOY 366 is 2000-12-31
        let ms = parse_time_string("2000-366T11:58:55.816").unwrap();
        assert_eq!(ms, 978_263_935_816);
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_time_string("12345").unwrap(), 12_345);
    }

    #[test]
    fn test_parse_truncates_subseconds() {
        let ms = parse_time_string("2012-001T00:00:00.123456").unwrap();
        assert_eq!(ms, 1_325_376_000_123);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_time_string("not a time"),
            Err(SclkScetError::Format(FormatError::InvalidTimeString(_)))
        ));
        assert!(parse_time_string("2012-400T00:00:00").is_err());
        assert!(parse_time_string("2012-13-01T00:00:00").is_err());
    }

    #[test]
    fn test_format_scet_doy() {
        assert_eq!(format_scet(1_325_376_000_123, true, 3), "2012-001T00:00:00.123");
        assert_eq!(format_scet(978_263_935_816, true, 3), "2000-366T11:58:55.816");
    }

    #[test]
    fn test_format_scet_iso() {
        assert_eq!(format_scet(1_325_376_000_123, false, 3), "2012-01-01T00:00:00.123");
    }

    #[test]
    fn test_format_scet_precision() {
        assert_eq!(format_scet(1_325_376_000_123, true, 1), "2012-001T00:00:00.1");
        assert_eq!(format_scet(1_325_376_000_123, true, 6), "2012-001T00:00:00.123000");
        assert_eq!(format_scet(1_325_376_000_123, true, 0), "2012-001T00:00:00");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(3_661.25, 3), "01:01:01.250");
        assert_eq!(format_hms(0.0, 3), "00:00:00.000");
    }

    #[test]
    fn test_format_hms_carry() {
        // rounding the subseconds up must carry into the seconds
        assert_eq!(format_hms(59.9999, 3), "00:01:00.000");
    }

    #[test]
    fn test_doy_to_iso() {
        assert_eq!(doy_to_iso("2019-032T01:02:03.123").unwrap(), "2019-02-01T01:02:03.123");
        assert!(doy_to_iso("2019-03").is_err());
    }

    #[test]
    fn test_epoch_bridge() {
        assert_eq!(unix_to_j2000(J2000_UNIX_SECONDS), 0.0);
        assert_eq!(j2000_to_unix(0.0), J2000_UNIX_SECONDS);
        assert_eq!(j2000_to_unix(unix_to_j2000(1.5e9)), 1.5e9);
    }
}
