//! `xs:duration` and its two totally ordered subtypes.
//!
//! A duration is a signed pair of a month count and a second count; both
//! components always carry the same sign.

use super::offset_from_minutes;
use crate::engine::runtime::{Error, ErrorCode};
use crate::xdm::format_decimal;
use chrono::FixedOffset;
use core::fmt;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsDuration {
    months: i64,
    seconds: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonthDuration {
    months: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayTimeDuration {
    seconds: Decimal,
}

#[derive(Debug, Default)]
struct DurationParts {
    negative: bool,
    months: i64,
    seconds: Decimal,
    has_year_month: bool,
    has_day_time: bool,
}

/// `-?P(nY)?(nM)?(nD)?(T(nH)?(nM)?(n(.n)?S)?)?` with at least one component
/// and no dangling `T`.
fn parse_parts(s: &str) -> Option<DurationParts> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s),
    };
    let rest = rest.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => {
            if t.is_empty() {
                return None;
            }
            (d, Some(t))
        }
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.is_none() {
        return None;
    }

    let mut parts = DurationParts {
        negative,
        ..DurationParts::default()
    };

    let date_fields = scan_fields(date_part, &['Y', 'M', 'D'])?;
    for (designator, value) in date_fields {
        let n = whole_number(value)?;
        match designator {
            'Y' => parts.months = parts.months.checked_add(n.checked_mul(12)?)?,
            'M' => parts.months = parts.months.checked_add(n)?,
            _ => parts.seconds += Decimal::from(n.checked_mul(SECONDS_PER_DAY)?),
        }
        if designator == 'D' {
            parts.has_day_time = true;
        } else {
            parts.has_year_month = true;
        }
    }

    if let Some(time_part) = time_part {
        let time_fields = scan_fields(time_part, &['H', 'M', 'S'])?;
        for (designator, value) in time_fields {
            let amount = match designator {
                'H' => Decimal::from(whole_number(value)?.checked_mul(3600)?),
                'M' => Decimal::from(whole_number(value)?.checked_mul(60)?),
                _ => seconds_field(value)?,
            };
            parts.seconds = parts.seconds.checked_add(amount)?;
            parts.has_day_time = true;
        }
    }
    Some(parts)
}

/// Split `5Y3M` into `[('Y', "5"), ('M', "3")]`, enforcing designator order.
fn scan_fields<'a>(s: &'a str, order: &[char]) -> Option<Vec<(char, &'a str)>> {
    let mut fields = Vec::new();
    let mut next = 0;
    let mut start = 0;
    for (idx, c) in s.char_indices() {
        if c.is_ascii_digit() || c == '.' {
            continue;
        }
        let pos = order[next..].iter().position(|d| *d == c)? + next;
        let value = &s[start..idx];
        if value.is_empty() {
            return None;
        }
        fields.push((c, value));
        next = pos + 1;
        start = idx + c.len_utf8();
    }
    if start != s.len() {
        return None;
    }
    Some(fields)
}

fn whole_number(s: &str) -> Option<i64> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn seconds_field(s: &str) -> Option<Decimal> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) if !f.is_empty() => (i, Some(f)),
        Some(_) => return None,
        None => (s, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(f) = frac_part
        && !f.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Decimal::from_str(s).ok()
}

fn format_components(months: i64, seconds: Decimal, zero: &str) -> String {
    if months == 0 && seconds.is_zero() {
        return zero.to_string();
    }
    let mut out = String::new();
    if months < 0 || (seconds.is_sign_negative() && !seconds.is_zero()) {
        out.push('-');
    }
    out.push('P');
    let months = months.unsigned_abs();
    let (years, months) = (months / 12, months % 12);
    if years != 0 {
        out.push_str(&format!("{years}Y"));
    }
    if months != 0 {
        out.push_str(&format!("{months}M"));
    }
    let seconds = seconds.abs();
    let day = Decimal::from(SECONDS_PER_DAY);
    let days = (seconds / day).trunc();
    let mut rest = seconds - days * day;
    let hours = (rest / Decimal::from(3600)).trunc();
    rest -= hours * Decimal::from(3600);
    let minutes = (rest / Decimal::from(60)).trunc();
    rest -= minutes * Decimal::from(60);
    if !days.is_zero() {
        out.push_str(&format!("{}D", format_decimal(&days)));
    }
    if !hours.is_zero() || !minutes.is_zero() || !rest.is_zero() {
        out.push('T');
        if !hours.is_zero() {
            out.push_str(&format!("{}H", format_decimal(&hours)));
        }
        if !minutes.is_zero() {
            out.push_str(&format!("{}M", format_decimal(&minutes)));
        }
        if !rest.is_zero() {
            out.push_str(&format!("{}S", format_decimal(&rest)));
        }
    }
    out
}

fn signed(negative: bool, months: i64, seconds: Decimal) -> (i64, Decimal) {
    if negative { (-months, -seconds) } else { (months, seconds) }
}

pub(crate) fn duration_overflow() -> Error {
    Error::from_code(ErrorCode::FODT0002, "duration value out of range")
}

impl XsDuration {
    /// `None` when the components carry opposite signs.
    pub fn new(months: i64, seconds: Decimal) -> Option<Self> {
        let mixed = (months < 0 && seconds > Decimal::ZERO) || (months > 0 && seconds < Decimal::ZERO);
        (!mixed).then_some(Self { months, seconds })
    }

    pub fn parse(s: &str) -> Option<Self> {
        let parts = parse_parts(s)?;
        let (months, seconds) = signed(parts.negative, parts.months, parts.seconds);
        Self::new(months, seconds)
    }

    pub fn months(&self) -> i64 {
        self.months
    }

    pub fn seconds(&self) -> Decimal {
        self.seconds
    }

    pub fn year_month(&self) -> YearMonthDuration {
        YearMonthDuration::from_months(self.months)
    }

    pub fn day_time(&self) -> DayTimeDuration {
        DayTimeDuration::from_seconds(self.seconds)
    }
}

impl From<YearMonthDuration> for XsDuration {
    fn from(d: YearMonthDuration) -> Self {
        Self {
            months: d.months,
            seconds: Decimal::ZERO,
        }
    }
}

impl From<DayTimeDuration> for XsDuration {
    fn from(d: DayTimeDuration) -> Self {
        Self {
            months: 0,
            seconds: d.seconds,
        }
    }
}

impl fmt::Display for XsDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_components(self.months, self.seconds, "PT0S"))
    }
}

impl YearMonthDuration {
    pub fn from_months(months: i64) -> Self {
        Self { months }
    }

    /// Only year and month components are allowed.
    pub fn parse(s: &str) -> Option<Self> {
        let parts = parse_parts(s)?;
        if parts.has_day_time {
            return None;
        }
        let (months, _) = signed(parts.negative, parts.months, Decimal::ZERO);
        Some(Self { months })
    }

    pub fn months(&self) -> i64 {
        self.months
    }

    /// Whole years, sign preserved.
    pub fn years_component(&self) -> i64 {
        self.months / 12
    }

    /// Months left after removing whole years, sign preserved.
    pub fn months_component(&self) -> i64 {
        self.months % 12
    }

    pub fn checked_add(self, other: Self) -> Result<Self, Error> {
        self.months
            .checked_add(other.months)
            .map(Self::from_months)
            .ok_or_else(duration_overflow)
    }

    pub fn checked_neg(self) -> Result<Self, Error> {
        self.months
            .checked_neg()
            .map(Self::from_months)
            .ok_or_else(duration_overflow)
    }
}

impl fmt::Display for YearMonthDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_components(self.months, Decimal::ZERO, "P0M"))
    }
}

impl DayTimeDuration {
    pub fn from_seconds(seconds: Decimal) -> Self {
        Self { seconds }
    }

    /// Only day and time components are allowed.
    pub fn parse(s: &str) -> Option<Self> {
        let parts = parse_parts(s)?;
        if parts.has_year_month {
            return None;
        }
        let (_, seconds) = signed(parts.negative, 0, parts.seconds);
        Some(Self { seconds })
    }

    /// Duration matching a timezone offset.
    pub fn from_timezone(tz: FixedOffset) -> Self {
        Self::from_seconds(Decimal::from(tz.local_minus_utc()))
    }

    /// Interpret this duration as a timezone offset. Raises `FODT0003` unless
    /// it is a whole number of minutes within ±14:00.
    pub fn to_timezone(&self) -> Result<FixedOffset, Error> {
        let invalid = || {
            Error::from_code(
                ErrorCode::FODT0003,
                format!("invalid timezone: {self}"),
            )
        };
        let sixty = Decimal::from(60);
        if !(self.seconds % sixty).is_zero() {
            return Err(invalid());
        }
        let minutes = (self.seconds / sixty).to_i32().ok_or_else(invalid)?;
        offset_from_minutes(minutes).ok_or_else(invalid)
    }

    pub fn seconds(&self) -> Decimal {
        self.seconds
    }

    pub fn days_component(&self) -> i128 {
        whole(self.seconds / Decimal::from(SECONDS_PER_DAY))
    }

    pub fn hours_component(&self) -> i128 {
        whole((self.seconds % Decimal::from(SECONDS_PER_DAY)) / Decimal::from(3600))
    }

    pub fn minutes_component(&self) -> i128 {
        whole((self.seconds % Decimal::from(3600)) / Decimal::from(60))
    }

    /// Seconds left after removing whole minutes, fraction and sign preserved.
    pub fn seconds_component(&self) -> Decimal {
        (self.seconds % Decimal::from(60)).normalize()
    }

    pub fn checked_add(self, other: Self) -> Result<Self, Error> {
        self.seconds
            .checked_add(other.seconds)
            .map(Self::from_seconds)
            .ok_or_else(duration_overflow)
    }

    pub fn checked_neg(self) -> Self {
        Self::from_seconds(-self.seconds)
    }
}

/// Integer part of `d`. A 96-bit mantissa at scale 0 always fits `i128`.
fn whole(d: Decimal) -> i128 {
    let mut t = d.trunc();
    t.rescale(0);
    t.mantissa()
}

impl fmt::Display for DayTimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_components(0, self.seconds, "PT0S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_forms() {
        assert_eq!(XsDuration::parse("P1Y13M").unwrap().to_string(), "P2Y1M");
        assert_eq!(XsDuration::parse("PT36H").unwrap().to_string(), "P1DT12H");
        assert_eq!(XsDuration::parse("-PT0.50S").unwrap().to_string(), "-PT0.5S");
        assert_eq!(XsDuration::parse("P0D").unwrap().to_string(), "PT0S");
        assert_eq!(YearMonthDuration::parse("P0Y").unwrap().to_string(), "P0M");
        assert_eq!(DayTimeDuration::parse("PT90M").unwrap().to_string(), "PT1H30M");
    }

    #[test]
    fn grammar() {
        assert!(XsDuration::parse("P").is_none());
        assert!(XsDuration::parse("P1YT").is_none());
        assert!(XsDuration::parse("P1M1Y").is_none());
        assert!(XsDuration::parse("PT1.S").is_none());
        assert!(XsDuration::parse("P1.5Y").is_none());
        assert!(XsDuration::parse("1Y").is_none());
        assert!(YearMonthDuration::parse("P1D").is_none());
        assert!(DayTimeDuration::parse("P1Y").is_none());
    }

    #[test]
    fn components_keep_sign() {
        let d = DayTimeDuration::parse("-P3DT10H12M1.5S").unwrap();
        assert_eq!(d.days_component(), -3);
        assert_eq!(d.hours_component(), -10);
        assert_eq!(d.minutes_component(), -12);
        assert_eq!(d.seconds_component(), Decimal::new(-15, 1));
        let ym = YearMonthDuration::parse("-P1Y1M").unwrap();
        assert_eq!((ym.years_component(), ym.months_component()), (-1, -1));
    }

    #[test]
    fn timezone_conversion() {
        let tz = DayTimeDuration::parse("-PT5H").unwrap().to_timezone().unwrap();
        assert_eq!(tz.local_minus_utc(), -5 * 3600);
        assert!(DayTimeDuration::parse("PT15H").unwrap().to_timezone().is_err());
        assert!(DayTimeDuration::parse("PT5H0.5S").unwrap().to_timezone().is_err());
    }
}
