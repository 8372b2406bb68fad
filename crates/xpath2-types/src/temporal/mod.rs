//! Date, time and calendar-fragment values.
//!
//! Every type stores its local (wall-clock) value plus an optional timezone.
//! An absent timezone is kept distinct from UTC; ordering and equality use
//! the implicit timezone of the static context to place such values on the
//! timeline.

use crate::engine::runtime::{Error, ErrorCode};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use core::fmt;
use rust_decimal::Decimal;

pub mod duration;
mod lexical;

pub use lexical::format_timezone;
pub(crate) use lexical::{offset_from_minutes, utc};
use lexical::{
    format_opt_timezone, format_time, format_year, parse_date_body, parse_time_body,
    parse_year_prefix, split_timezone, two_digits,
};

/// Year used to anchor the calendar fragments on the timeline. 1972 is a
/// leap year, so `--02-29` is representable.
const REFERENCE_YEAR: i32 = 1972;

fn reference_date(month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day)
}

// 1972-12-31, the date xs:time values are placed on for comparison.
fn time_reference_date() -> NaiveDate {
    reference_date(12, 31).unwrap_or_default()
}

pub(crate) fn datetime_overflow() -> Error {
    Error::from_code(ErrorCode::FODT0001, "date/time value out of range")
}

/// Common view of the timezone-carrying temporal types.
pub trait Temporal {
    /// Wall-clock value, anchored on the reference calendar for partial types.
    fn local_datetime(&self) -> NaiveDateTime;

    fn timezone(&self) -> Option<FixedOffset>;

    fn is_timezoned(&self) -> bool {
        self.timezone().is_some()
    }

    /// UTC instant, using `implicit` when the value has no timezone.
    fn instant(&self, implicit: FixedOffset) -> Result<NaiveDateTime, Error> {
        let offset = self.timezone().unwrap_or(implicit).local_minus_utc();
        self.local_datetime()
            .checked_sub_signed(TimeDelta::seconds(i64::from(offset)))
            .ok_or_else(datetime_overflow)
    }
}

/// Seconds field including the fractional part.
pub(crate) fn seconds_with_fraction(t: NaiveTime) -> Decimal {
    Decimal::from(t.second()) + Decimal::new(i64::from(t.nanosecond()), 9)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsDateTime {
    value: NaiveDateTime,
    tz: Option<FixedOffset>,
}

impl XsDateTime {
    pub fn new(value: NaiveDateTime, tz: Option<FixedOffset>) -> Self {
        Self { value, tz }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (body, tz) = split_timezone(s)?;
        let (date, time) = body.split_once('T')?;
        let date = parse_date_body(date)?;
        let (time, end_of_day) = parse_time_body(time)?;
        let date = if end_of_day { date.succ_opt()? } else { date };
        Some(Self::new(NaiveDateTime::new(date, time), tz))
    }

    /// Combine a date and a time as `fn:dateTime` does: the timezones must
    /// agree when both are present, otherwise whichever exists is kept.
    pub fn from_date_and_time(date: &XsDate, time: &XsTime) -> Result<Self, Error> {
        let tz = match (date.tz, time.tz) {
            (Some(a), Some(b)) if a != b => {
                return Err(Error::from_code(
                    ErrorCode::FORG0008,
                    format!(
                        "date and time have different timezones ({} and {})",
                        format_timezone(a),
                        format_timezone(b)
                    ),
                ));
            }
            (a, b) => a.or(b),
        };
        Ok(Self::new(NaiveDateTime::new(date.date, time.time), tz))
    }

    pub fn value(&self) -> NaiveDateTime {
        self.value
    }

    pub fn date(&self) -> XsDate {
        XsDate::new(self.value.date(), self.tz)
    }

    pub fn time(&self) -> XsTime {
        XsTime::new(self.value.time(), self.tz)
    }

    pub fn year(&self) -> i32 {
        self.value.year()
    }

    pub fn month(&self) -> u32 {
        self.value.month()
    }

    pub fn day(&self) -> u32 {
        self.value.day()
    }

    pub fn hour(&self) -> u32 {
        self.value.hour()
    }

    pub fn minute(&self) -> u32 {
        self.value.minute()
    }

    pub fn second(&self) -> Decimal {
        seconds_with_fraction(self.value.time())
    }

    pub fn with_timezone(self, tz: Option<FixedOffset>) -> Self {
        Self { tz, ..self }
    }

    /// `fn:adjust-dateTime-to-timezone` semantics; `None` strips the timezone.
    pub fn adjust_to_timezone(&self, tz: Option<FixedOffset>) -> Result<Self, Error> {
        match (self.tz, tz) {
            (_, None) => Ok(Self::new(self.value, None)),
            (None, Some(target)) => Ok(Self::new(self.value, Some(target))),
            (Some(current), Some(target)) => {
                let shift = target.local_minus_utc() - current.local_minus_utc();
                let value = self
                    .value
                    .checked_add_signed(TimeDelta::seconds(i64::from(shift)))
                    .ok_or_else(datetime_overflow)?;
                Ok(Self::new(value, Some(target)))
            }
        }
    }
}

impl Temporal for XsDateTime {
    fn local_datetime(&self) -> NaiveDateTime {
        self.value
    }

    fn timezone(&self) -> Option<FixedOffset> {
        self.tz
    }
}

impl fmt::Display for XsDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02}T{}{}",
            format_year(self.value.year()),
            self.value.month(),
            self.value.day(),
            format_time(self.value.time()),
            format_opt_timezone(self.tz)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsDate {
    date: NaiveDate,
    tz: Option<FixedOffset>,
}

impl XsDate {
    pub fn new(date: NaiveDate, tz: Option<FixedOffset>) -> Self {
        Self { date, tz }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (body, tz) = split_timezone(s)?;
        Some(Self::new(parse_date_body(body)?, tz))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// Midnight at the start of this date, same timezone.
    pub fn to_date_time(&self) -> XsDateTime {
        XsDateTime::new(self.date.and_time(NaiveTime::MIN), self.tz)
    }

    pub fn with_timezone(self, tz: Option<FixedOffset>) -> Self {
        Self { tz, ..self }
    }

    pub fn adjust_to_timezone(&self, tz: Option<FixedOffset>) -> Result<Self, Error> {
        Ok(self.to_date_time().adjust_to_timezone(tz)?.date())
    }
}

impl Temporal for XsDate {
    fn local_datetime(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }

    fn timezone(&self) -> Option<FixedOffset> {
        self.tz
    }
}

impl fmt::Display for XsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02}{}",
            format_year(self.date.year()),
            self.date.month(),
            self.date.day(),
            format_opt_timezone(self.tz)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsTime {
    time: NaiveTime,
    tz: Option<FixedOffset>,
}

impl XsTime {
    pub fn new(time: NaiveTime, tz: Option<FixedOffset>) -> Self {
        Self { time, tz }
    }

    /// `24:00:00` is accepted and normalised to `00:00:00`.
    pub fn parse(s: &str) -> Option<Self> {
        let (body, tz) = split_timezone(s)?;
        let (time, _) = parse_time_body(body)?;
        Some(Self::new(time, tz))
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    pub fn second(&self) -> Decimal {
        seconds_with_fraction(self.time)
    }

    pub fn with_timezone(self, tz: Option<FixedOffset>) -> Self {
        Self { tz, ..self }
    }

    pub fn adjust_to_timezone(&self, tz: Option<FixedOffset>) -> Result<Self, Error> {
        let anchored = XsDateTime::new(self.local_datetime(), self.tz);
        Ok(anchored.adjust_to_timezone(tz)?.time())
    }
}

impl Temporal for XsTime {
    fn local_datetime(&self) -> NaiveDateTime {
        time_reference_date().and_time(self.time)
    }

    fn timezone(&self) -> Option<FixedOffset> {
        self.tz
    }
}

impl fmt::Display for XsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_time(self.time), format_opt_timezone(self.tz))
    }
}

// Calendar fragments keep their anchor date so they share the Temporal
// ordering machinery with full dates.
macro_rules! calendar_fragment {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            anchor: NaiveDate,
            tz: Option<FixedOffset>,
        }

        impl $name {
            pub fn with_timezone(self, tz: Option<FixedOffset>) -> Self {
                Self { tz, ..self }
            }
        }

        impl Temporal for $name {
            fn local_datetime(&self) -> NaiveDateTime {
                self.anchor.and_time(NaiveTime::MIN)
            }

            fn timezone(&self) -> Option<FixedOffset> {
                self.tz
            }
        }
    };
}

calendar_fragment!(
    /// `xs:gYearMonth`, anchored on the first day of the month.
    GYearMonth
);
calendar_fragment!(
    /// `xs:gYear`, anchored on January 1st.
    GYear
);
calendar_fragment!(
    /// `xs:gMonthDay`, anchored in the reference leap year.
    GMonthDay
);
calendar_fragment!(
    /// `xs:gDay`, anchored in December of the reference year.
    GDay
);
calendar_fragment!(
    /// `xs:gMonth`, anchored on the first of the month in the reference year.
    GMonth
);

impl GYearMonth {
    pub fn new(year: i32, month: u32, tz: Option<FixedOffset>) -> Option<Self> {
        let anchor = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { anchor, tz })
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (body, tz) = split_timezone(s)?;
        let (year, rest) = parse_year_prefix(body)?;
        let month = two_digits(rest.strip_prefix('-')?)?;
        Self::new(year, month, tz)
    }

    pub fn year(&self) -> i32 {
        self.anchor.year()
    }

    pub fn month(&self) -> u32 {
        self.anchor.month()
    }
}

impl fmt::Display for GYearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}{}",
            format_year(self.year()),
            self.month(),
            format_opt_timezone(self.tz)
        )
    }
}

impl GYear {
    pub fn new(year: i32, tz: Option<FixedOffset>) -> Option<Self> {
        let anchor = NaiveDate::from_ymd_opt(year, 1, 1)?;
        Some(Self { anchor, tz })
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (body, tz) = split_timezone(s)?;
        let (year, rest) = parse_year_prefix(body)?;
        if !rest.is_empty() {
            return None;
        }
        Self::new(year, tz)
    }

    pub fn year(&self) -> i32 {
        self.anchor.year()
    }
}

impl fmt::Display for GYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_year(self.year()), format_opt_timezone(self.tz))
    }
}

impl GMonthDay {
    /// Fails for days that do not exist in any year (`--02-30`, `--04-31`).
    pub fn new(month: u32, day: u32, tz: Option<FixedOffset>) -> Option<Self> {
        let anchor = reference_date(month, day)?;
        Some(Self { anchor, tz })
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (body, tz) = split_timezone(s)?;
        let rest = body.strip_prefix("--")?;
        if rest.len() != 5 || rest.as_bytes()[2] != b'-' {
            return None;
        }
        Self::new(two_digits(&rest[..2])?, two_digits(&rest[3..])?, tz)
    }

    pub fn month(&self) -> u32 {
        self.anchor.month()
    }

    pub fn day(&self) -> u32 {
        self.anchor.day()
    }
}

impl fmt::Display for GMonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--{:02}-{:02}{}",
            self.month(),
            self.day(),
            format_opt_timezone(self.tz)
        )
    }
}

impl GDay {
    pub fn new(day: u32, tz: Option<FixedOffset>) -> Option<Self> {
        let anchor = reference_date(12, day)?;
        Some(Self { anchor, tz })
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (body, tz) = split_timezone(s)?;
        Self::new(two_digits(body.strip_prefix("---")?)?, tz)
    }

    pub fn day(&self) -> u32 {
        self.anchor.day()
    }
}

impl fmt::Display for GDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "---{:02}{}", self.day(), format_opt_timezone(self.tz))
    }
}

impl GMonth {
    pub fn new(month: u32, tz: Option<FixedOffset>) -> Option<Self> {
        let anchor = reference_date(month, 1)?;
        Some(Self { anchor, tz })
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (body, tz) = split_timezone(s)?;
        Self::new(two_digits(body.strip_prefix("--")?)?, tz)
    }

    pub fn month(&self) -> u32 {
        self.anchor.month()
    }
}

impl fmt::Display for GMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{:02}{}", self.month(), format_opt_timezone(self.tz))
    }
}
