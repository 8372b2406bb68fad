//! Arithmetic operators over numerics, durations and date/time values.

use crate::engine::casting::cast;
use crate::engine::numeric::{NumKind, classify, int_to_decimal, unify_numeric};
use crate::engine::runtime::{Error, ErrorCode};
use crate::temporal::duration::{DayTimeDuration, YearMonthDuration, duration_overflow};
use crate::temporal::{Temporal, XsDateTime, XsTime, datetime_overflow};
use crate::xdm::{AtomicKind, XdmAtomicValue};
use chrono::{FixedOffset, Months, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Mod,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "div",
            ArithmeticOp::IntegerDivide => "idiv",
            ArithmeticOp::Mod => "mod",
        }
    }
}

fn unsupported(a: &XdmAtomicValue, op: ArithmeticOp, b: &XdmAtomicValue) -> Error {
    Error::type_error(format!(
        "operator '{}' is not defined for {} and {}",
        op.symbol(),
        a.type_name(),
        b.type_name()
    ))
}

fn div_by_zero() -> Error {
    Error::from_code(ErrorCode::FOAR0001, "division by zero")
}

fn numeric_overflow() -> Error {
    Error::from_code(ErrorCode::FOAR0002, "numeric overflow")
}

/// Apply a binary arithmetic operator.
///
/// `xs:untypedAtomic` operands are cast to `xs:double` first. Date/time
/// subtraction places values without a timezone using `implicit_tz`.
pub fn arithmetic(
    lhs: &XdmAtomicValue,
    op: ArithmeticOp,
    rhs: &XdmAtomicValue,
    implicit_tz: FixedOffset,
) -> Result<XdmAtomicValue, Error> {
    let lhs = untyped_to_double(lhs)?;
    let rhs = untyped_to_double(rhs)?;
    if let (Some(a), Some(b)) = (classify(&lhs), classify(&rhs)) {
        return numeric(a, op, b);
    }
    temporal(&lhs, op, &rhs, implicit_tz)?.ok_or_else(|| unsupported(&lhs, op, &rhs))
}

/// Unary minus.
pub fn negate(value: &XdmAtomicValue) -> Result<XdmAtomicValue, Error> {
    let value = untyped_to_double(value)?;
    Ok(match &value {
        XdmAtomicValue::Integer(i) => {
            XdmAtomicValue::integer(i.value().checked_neg().ok_or_else(numeric_overflow)?)
        }
        XdmAtomicValue::Decimal(d) => XdmAtomicValue::Decimal(-*d),
        XdmAtomicValue::Float(f) => XdmAtomicValue::Float(-*f),
        XdmAtomicValue::Double(d) => XdmAtomicValue::Double(-*d),
        XdmAtomicValue::YearMonthDuration(d) => XdmAtomicValue::YearMonthDuration(d.checked_neg()?),
        XdmAtomicValue::DayTimeDuration(d) => XdmAtomicValue::DayTimeDuration(d.checked_neg()),
        other => {
            return Err(Error::type_error(format!(
                "unary minus is not defined for {}",
                other.type_name()
            )));
        }
    })
}

fn untyped_to_double(v: &XdmAtomicValue) -> Result<XdmAtomicValue, Error> {
    match v {
        XdmAtomicValue::UntypedAtomic(_) => cast(v, AtomicKind::Double),
        other => Ok(other.clone()),
    }
}

fn numeric(a: NumKind, op: ArithmeticOp, b: NumKind) -> Result<XdmAtomicValue, Error> {
    match unify_numeric(a, b) {
        (NumKind::Int(x), NumKind::Int(y)) => integer_op(x, op, y),
        (NumKind::Dec(x), NumKind::Dec(y)) => decimal_op(x, op, y),
        (NumKind::Float(x), NumKind::Float(y)) => match op {
            ArithmeticOp::IntegerDivide => float_idiv(f64::from(x), f64::from(y)),
            _ => Ok(XdmAtomicValue::Float(float_op(x, op, y))),
        },
        (x, y) => {
            let (x, y) = (x.to_f64(), y.to_f64());
            match op {
                ArithmeticOp::IntegerDivide => float_idiv(x, y),
                _ => Ok(XdmAtomicValue::Double(double_op(x, op, y))),
            }
        }
    }
}

fn integer_op(x: i128, op: ArithmeticOp, y: i128) -> Result<XdmAtomicValue, Error> {
    let value = match op {
        ArithmeticOp::Add => x.checked_add(y),
        ArithmeticOp::Subtract => x.checked_sub(y),
        ArithmeticOp::Multiply => x.checked_mul(y),
        ArithmeticOp::Divide => {
            if y == 0 {
                return Err(div_by_zero());
            }
            // integer div integer yields xs:decimal
            let (Some(dx), Some(dy)) = (int_to_decimal(x), int_to_decimal(y)) else {
                return Err(numeric_overflow());
            };
            return dx
                .checked_div(dy)
                .map(|d| XdmAtomicValue::Decimal(d.normalize()))
                .ok_or_else(numeric_overflow);
        }
        ArithmeticOp::IntegerDivide => {
            if y == 0 {
                return Err(div_by_zero());
            }
            x.checked_div(y)
        }
        ArithmeticOp::Mod => {
            if y == 0 {
                return Err(div_by_zero());
            }
            x.checked_rem(y)
        }
    };
    value.map(XdmAtomicValue::integer).ok_or_else(numeric_overflow)
}

fn decimal_op(x: Decimal, op: ArithmeticOp, y: Decimal) -> Result<XdmAtomicValue, Error> {
    if matches!(op, ArithmeticOp::Divide | ArithmeticOp::IntegerDivide | ArithmeticOp::Mod)
        && y.is_zero()
    {
        return Err(div_by_zero());
    }
    let value = match op {
        ArithmeticOp::Add => x.checked_add(y),
        ArithmeticOp::Subtract => x.checked_sub(y),
        ArithmeticOp::Multiply => x.checked_mul(y),
        ArithmeticOp::Divide => x.checked_div(y),
        ArithmeticOp::IntegerDivide => {
            let q = x.checked_div(y).ok_or_else(numeric_overflow)?;
            let i = q.trunc().to_i128().ok_or_else(numeric_overflow)?;
            return Ok(XdmAtomicValue::integer(i));
        }
        ArithmeticOp::Mod => x.checked_rem(y),
    };
    value
        .map(|d| XdmAtomicValue::Decimal(d.normalize()))
        .ok_or_else(numeric_overflow)
}

fn float_op(x: f32, op: ArithmeticOp, y: f32) -> f32 {
    match op {
        ArithmeticOp::Add => x + y,
        ArithmeticOp::Subtract => x - y,
        ArithmeticOp::Multiply => x * y,
        ArithmeticOp::Divide => x / y,
        ArithmeticOp::Mod | ArithmeticOp::IntegerDivide => x % y,
    }
}

fn double_op(x: f64, op: ArithmeticOp, y: f64) -> f64 {
    match op {
        ArithmeticOp::Add => x + y,
        ArithmeticOp::Subtract => x - y,
        ArithmeticOp::Multiply => x * y,
        ArithmeticOp::Divide => x / y,
        ArithmeticOp::Mod | ArithmeticOp::IntegerDivide => x % y,
    }
}

fn float_idiv(x: f64, y: f64) -> Result<XdmAtomicValue, Error> {
    if y == 0.0 {
        return Err(div_by_zero());
    }
    if x.is_nan() || y.is_nan() || x.is_infinite() {
        return Err(Error::from_code(
            ErrorCode::FOAR0002,
            "idiv operand is NaN or infinite",
        ));
    }
    let q = (x / y).trunc();
    if q >= i128::MAX as f64 || q < i128::MIN as f64 {
        return Err(numeric_overflow());
    }
    Ok(XdmAtomicValue::integer(q as i128))
}

/// Duration and date/time arithmetic; `Ok(None)` when the operand types have
/// no operator mapping.
fn temporal(
    a: &XdmAtomicValue,
    op: ArithmeticOp,
    b: &XdmAtomicValue,
    tz: FixedOffset,
) -> Result<Option<XdmAtomicValue>, Error> {
    use ArithmeticOp::*;
    use XdmAtomicValue as V;
    let out = match (a, op, b) {
        (V::YearMonthDuration(x), Add, V::YearMonthDuration(y)) => V::YearMonthDuration(x.checked_add(*y)?),
        (V::YearMonthDuration(x), Subtract, V::YearMonthDuration(y)) => {
            V::YearMonthDuration(x.checked_add(y.checked_neg()?)?)
        }
        (V::DayTimeDuration(x), Add, V::DayTimeDuration(y)) => V::DayTimeDuration(x.checked_add(*y)?),
        (V::DayTimeDuration(x), Subtract, V::DayTimeDuration(y)) => {
            V::DayTimeDuration(x.checked_add(y.checked_neg())?)
        }

        (V::YearMonthDuration(d), Multiply, n) | (n, Multiply, V::YearMonthDuration(d))
            if n.is_numeric() =>
        {
            V::YearMonthDuration(scale_months(*d, factor(n)?, false)?)
        }
        (V::YearMonthDuration(d), Divide, n) if n.is_numeric() => {
            V::YearMonthDuration(scale_months(*d, factor(n)?, true)?)
        }
        (V::YearMonthDuration(x), Divide, V::YearMonthDuration(y)) => {
            if y.months() == 0 {
                return Err(div_by_zero());
            }
            V::Decimal(ratio(Decimal::from(x.months()), Decimal::from(y.months()))?)
        }
        (V::DayTimeDuration(d), Multiply, n) | (n, Multiply, V::DayTimeDuration(d))
            if n.is_numeric() =>
        {
            V::DayTimeDuration(scale_seconds(*d, factor(n)?, false)?)
        }
        (V::DayTimeDuration(d), Divide, n) if n.is_numeric() => {
            V::DayTimeDuration(scale_seconds(*d, factor(n)?, true)?)
        }
        (V::DayTimeDuration(x), Divide, V::DayTimeDuration(y)) => {
            if y.seconds().is_zero() {
                return Err(div_by_zero());
            }
            V::Decimal(ratio(x.seconds(), y.seconds())?)
        }

        (V::DateTime(dt), Add, V::YearMonthDuration(d)) | (V::YearMonthDuration(d), Add, V::DateTime(dt)) => {
            V::DateTime(add_months(dt, d.months())?)
        }
        (V::DateTime(dt), Subtract, V::YearMonthDuration(d)) => {
            V::DateTime(add_months(dt, d.checked_neg()?.months())?)
        }
        (V::DateTime(dt), Add, V::DayTimeDuration(d)) | (V::DayTimeDuration(d), Add, V::DateTime(dt)) => {
            V::DateTime(add_seconds(dt, d.seconds())?)
        }
        (V::DateTime(dt), Subtract, V::DayTimeDuration(d)) => {
            V::DateTime(add_seconds(dt, -d.seconds())?)
        }
        (V::Date(date), Add, V::YearMonthDuration(d)) | (V::YearMonthDuration(d), Add, V::Date(date)) => {
            V::Date(add_months(&date.to_date_time(), d.months())?.date())
        }
        (V::Date(date), Subtract, V::YearMonthDuration(d)) => {
            V::Date(add_months(&date.to_date_time(), d.checked_neg()?.months())?.date())
        }
        (V::Date(date), Add, V::DayTimeDuration(d)) | (V::DayTimeDuration(d), Add, V::Date(date)) => {
            V::Date(add_seconds(&date.to_date_time(), d.seconds())?.date())
        }
        (V::Date(date), Subtract, V::DayTimeDuration(d)) => {
            V::Date(add_seconds(&date.to_date_time(), -d.seconds())?.date())
        }
        (V::Time(t), Add, V::DayTimeDuration(d)) | (V::DayTimeDuration(d), Add, V::Time(t)) => {
            V::Time(add_to_time(t, d.seconds())?)
        }
        (V::Time(t), Subtract, V::DayTimeDuration(d)) => V::Time(add_to_time(t, -d.seconds())?),

        (V::DateTime(x), Subtract, V::DateTime(y)) => V::DayTimeDuration(difference(x, y, tz)?),
        (V::Date(x), Subtract, V::Date(y)) => V::DayTimeDuration(difference(x, y, tz)?),
        (V::Time(x), Subtract, V::Time(y)) => V::DayTimeDuration(difference(x, y, tz)?),
        _ => return Ok(None),
    };
    Ok(Some(out))
}

fn factor(n: &XdmAtomicValue) -> Result<f64, Error> {
    let f = classify(n).map_or(f64::NAN, NumKind::to_f64);
    if f.is_nan() {
        return Err(Error::from_code(
            ErrorCode::FOCA0005,
            "NaN supplied as duration factor",
        ));
    }
    Ok(f)
}

fn ratio(x: Decimal, y: Decimal) -> Result<Decimal, Error> {
    x.checked_div(y)
        .map(|d| d.normalize())
        .ok_or_else(numeric_overflow)
}

/// Multiply or divide a month count, rounding half up to whole months.
fn scale_months(d: YearMonthDuration, f: f64, divide: bool) -> Result<YearMonthDuration, Error> {
    if divide && f == 0.0 {
        return Err(duration_overflow());
    }
    let raw = if divide {
        d.months() as f64 / f
    } else {
        d.months() as f64 * f
    };
    let rounded = (raw + 0.5).floor();
    if !rounded.is_finite() || rounded.abs() >= i64::MAX as f64 {
        return Err(duration_overflow());
    }
    Ok(YearMonthDuration::from_months(rounded as i64))
}

fn scale_seconds(d: DayTimeDuration, f: f64, divide: bool) -> Result<DayTimeDuration, Error> {
    if divide && f == 0.0 {
        return Err(duration_overflow());
    }
    if f.is_infinite() {
        return if divide {
            Ok(DayTimeDuration::from_seconds(Decimal::ZERO))
        } else {
            Err(duration_overflow())
        };
    }
    let factor = Decimal::from_f64(f).ok_or_else(duration_overflow)?;
    let seconds = if divide {
        d.seconds().checked_div(factor)
    } else {
        d.seconds().checked_mul(factor)
    }
    .ok_or_else(duration_overflow)?;
    Ok(DayTimeDuration::from_seconds(seconds.normalize()))
}

/// Calendar month arithmetic; the day is clamped to the end of the target month.
fn add_months(dt: &XsDateTime, months: i64) -> Result<XsDateTime, Error> {
    let date = dt.value().date();
    let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| datetime_overflow())?;
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(magnitude))
    } else {
        date.checked_sub_months(Months::new(magnitude))
    }
    .ok_or_else(datetime_overflow)?;
    Ok(XsDateTime::new(
        NaiveDateTime::new(shifted, dt.value().time()),
        dt.timezone(),
    ))
}

fn seconds_delta(seconds: Decimal) -> Result<TimeDelta, Error> {
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * Decimal::from(1_000_000_000))
        .trunc()
        .to_i64()
        .ok_or_else(datetime_overflow)?;
    let whole = whole.to_i64().ok_or_else(datetime_overflow)?;
    TimeDelta::try_seconds(whole)
        .and_then(|d| d.checked_add(&TimeDelta::nanoseconds(nanos)))
        .ok_or_else(datetime_overflow)
}

fn add_seconds(dt: &XsDateTime, seconds: Decimal) -> Result<XsDateTime, Error> {
    let value = dt
        .value()
        .checked_add_signed(seconds_delta(seconds)?)
        .ok_or_else(datetime_overflow)?;
    Ok(XsDateTime::new(value, dt.timezone()))
}

/// Time arithmetic wraps around midnight.
fn add_to_time(t: &XsTime, seconds: Decimal) -> Result<XsTime, Error> {
    let (time, _) = t.time().overflowing_add_signed(seconds_delta(seconds)?);
    Ok(XsTime::new(time, t.timezone()))
}

fn difference<T: Temporal>(a: &T, b: &T, tz: FixedOffset) -> Result<DayTimeDuration, Error> {
    let delta = a.instant(tz)?.signed_duration_since(b.instant(tz)?);
    let seconds = Decimal::from(delta.num_seconds()) + Decimal::new(i64::from(delta.subsec_nanos()), 9);
    Ok(DayTimeDuration::from_seconds(seconds.normalize()))
}
