//! Shared pieces of the ISO 8601 profile used by the XML Schema date/time types.

use chrono::{FixedOffset, NaiveDate, NaiveTime, Offset, Timelike, Utc};

const MAX_TZ_MINUTES: i32 = 14 * 60;

/// Split a trailing `Z` / `±hh:mm` off `s`. Returns `None` when a suffix is
/// present but malformed.
pub(crate) fn split_timezone(s: &str) -> Option<(&str, Option<FixedOffset>)> {
    if !s.is_ascii() {
        return None;
    }
    if let Some(body) = s.strip_suffix('Z') {
        return Some((body, Some(utc())));
    }
    let bytes = s.as_bytes();
    let len = bytes.len();
    if len >= 6 && matches!(bytes[len - 6], b'+' | b'-') && bytes[len - 3] == b':' {
        let tz = parse_offset(&s[len - 6..])?;
        return Some((&s[..len - 6], Some(tz)));
    }
    Some((s, None))
}

/// `±hh:mm` within ±14:00.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let sign = match s.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours = two_digits(s.get(1..3)?)?;
    if s.as_bytes().get(3) != Some(&b':') || s.len() != 6 {
        return None;
    }
    let minutes = two_digits(s.get(4..6)?)?;
    if minutes > 59 {
        return None;
    }
    offset_from_minutes(sign * (hours as i32 * 60 + minutes as i32))
}

pub(crate) fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    if minutes.abs() > MAX_TZ_MINUTES {
        return None;
    }
    FixedOffset::east_opt(minutes * 60)
}

pub(crate) fn utc() -> FixedOffset {
    Utc.fix()
}

/// Canonical timezone: `Z` for a zero offset, otherwise `±hh:mm`.
pub fn format_timezone(tz: FixedOffset) -> String {
    let secs = tz.local_minus_utc();
    if secs == 0 {
        return "Z".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let minutes = secs.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

pub(crate) fn format_opt_timezone(tz: Option<FixedOffset>) -> String {
    tz.map(format_timezone).unwrap_or_default()
}

/// Exactly two ASCII digits.
pub(crate) fn two_digits(s: &str) -> Option<u32> {
    let b = s.as_bytes();
    if b.len() != 2 || !b[0].is_ascii_digit() || !b[1].is_ascii_digit() {
        return None;
    }
    Some(u32::from(b[0] - b'0') * 10 + u32::from(b[1] - b'0'))
}

/// `-?yyyy+` at the start of `s`: at least four digits, no leading zero
/// beyond four, and never year zero.
pub(crate) fn parse_year_prefix(s: &str) -> Option<(i32, &str)> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits < 4 || (digits > 4 && rest.starts_with('0')) {
        return None;
    }
    let year: i32 = rest[..digits].parse().ok()?;
    if year == 0 {
        return None;
    }
    Some((if negative { -year } else { year }, &rest[digits..]))
}

/// `yyyy-mm-dd`
pub(crate) fn parse_date_body(s: &str) -> Option<NaiveDate> {
    let (year, rest) = parse_year_prefix(s)?;
    let rest = rest.strip_prefix('-')?;
    if !rest.is_ascii() || rest.len() != 5 || rest.as_bytes()[2] != b'-' {
        return None;
    }
    let month = two_digits(&rest[..2])?;
    let day = two_digits(&rest[3..])?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `hh:mm:ss(.f+)?`. The flag reports `24:00:00`, which maps to midnight of
/// the following day.
pub(crate) fn parse_time_body(s: &str) -> Option<(NaiveTime, bool)> {
    if !s.is_ascii() || s.len() < 8 || s.as_bytes()[2] != b':' || s.as_bytes()[5] != b':' {
        return None;
    }
    let hour = two_digits(&s[..2])?;
    let minute = two_digits(&s[3..5])?;
    let second = two_digits(&s[6..8])?;
    let fraction = &s[8..];
    let nanos = if fraction.is_empty() {
        0
    } else {
        let digits = fraction.strip_prefix('.')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        parse_nanos(digits)
    };
    if hour == 24 {
        return (minute == 0 && second == 0 && nanos == 0).then_some((NaiveTime::MIN, true));
    }
    if minute > 59 || second > 59 {
        return None;
    }
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos).map(|t| (t, false))
}

// fractional digits beyond nanosecond precision are truncated
fn parse_nanos(digits: &str) -> u32 {
    digits
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
}

pub(crate) fn format_year(year: i32) -> String {
    if year < 0 {
        format!("-{:04}", -(year as i64))
    } else {
        format!("{year:04}")
    }
}

pub(crate) fn format_time(t: NaiveTime) -> String {
    let mut out = format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second());
    let nanos = t.nanosecond();
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}
