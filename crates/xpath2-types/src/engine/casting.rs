//! Casting between atomic types.
//!
//! Whether a cast is allowed at all depends only on the primitive types of
//! source and target, and is decided by one table ([`CAST_MATRIX`]). The table
//! also names the transform used. Value-dependent failures (bad lexical form,
//! facet violation, NaN to decimal, ...) come from the transform itself.

use crate::engine::numeric::int_to_decimal;
use crate::engine::runtime::{Error, ErrorCode, NamespaceBindings};
use crate::temporal::{GDay, GMonth, GMonthDay, GYear, GYearMonth, Temporal, XsDate, XsTime};
use crate::xdm::{AtomicKind, ExpandedName, XdmAtomicValue, XsInteger};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// How a permitted cast is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastRule {
    Forbidden,
    /// Same primitive type; only facets of a derived target are re-checked.
    Identity,
    /// Canonical string of the source.
    ToString,
    /// Parse the source string as the target's lexical form.
    Parse,
    /// Value conversion among numerics and booleans.
    Numeric,
    /// Conversion within the duration family.
    Duration,
    /// Projection of a date or dateTime onto a narrower temporal type.
    Project,
}

/// Primitive types indexing the cast table. Derived integer types share the
/// `Integer` row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primitive {
    UntypedAtomic,
    String,
    Float,
    Double,
    Decimal,
    Integer,
    Duration,
    YearMonthDuration,
    DayTimeDuration,
    DateTime,
    Time,
    Date,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
    Boolean,
    AnyUri,
    QName,
}

impl Primitive {
    fn of(kind: AtomicKind) -> Self {
        match kind {
            AtomicKind::UntypedAtomic => Primitive::UntypedAtomic,
            AtomicKind::String => Primitive::String,
            AtomicKind::Float => Primitive::Float,
            AtomicKind::Double => Primitive::Double,
            AtomicKind::Decimal => Primitive::Decimal,
            AtomicKind::Integer(_) => Primitive::Integer,
            AtomicKind::Duration => Primitive::Duration,
            AtomicKind::YearMonthDuration => Primitive::YearMonthDuration,
            AtomicKind::DayTimeDuration => Primitive::DayTimeDuration,
            AtomicKind::DateTime => Primitive::DateTime,
            AtomicKind::Time => Primitive::Time,
            AtomicKind::Date => Primitive::Date,
            AtomicKind::GYearMonth => Primitive::GYearMonth,
            AtomicKind::GYear => Primitive::GYear,
            AtomicKind::GMonthDay => Primitive::GMonthDay,
            AtomicKind::GDay => Primitive::GDay,
            AtomicKind::GMonth => Primitive::GMonth,
            AtomicKind::Boolean => Primitive::Boolean,
            AtomicKind::AnyUri => Primitive::AnyUri,
            AtomicKind::QName => Primitive::QName,
        }
    }
}

const X: CastRule = CastRule::Forbidden;
const I: CastRule = CastRule::Identity;
const S: CastRule = CastRule::ToString;
const P: CastRule = CastRule::Parse;
const U: CastRule = CastRule::Numeric;
const D: CastRule = CastRule::Duration;
const T: CastRule = CastRule::Project;

/// Rows are sources, columns targets, both in [`Primitive`] order:
/// uA str flt dbl dec int dur yMD dTD dT tim dat gYM gY gMD gD gM bool aURI QN
#[rustfmt::skip]
const CAST_MATRIX: [[CastRule; 20]; 20] = [
    /* uA   */ [I, S, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, X],
    /* str  */ [S, I, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P, P],
    /* flt  */ [S, S, I, U, U, U, X, X, X, X, X, X, X, X, X, X, X, U, X, X],
    /* dbl  */ [S, S, U, I, U, U, X, X, X, X, X, X, X, X, X, X, X, U, X, X],
    /* dec  */ [S, S, U, U, I, U, X, X, X, X, X, X, X, X, X, X, X, U, X, X],
    /* int  */ [S, S, U, U, U, I, X, X, X, X, X, X, X, X, X, X, X, U, X, X],
    /* dur  */ [S, S, X, X, X, X, I, D, D, X, X, X, X, X, X, X, X, X, X, X],
    /* yMD  */ [S, S, X, X, X, X, D, I, D, X, X, X, X, X, X, X, X, X, X, X],
    /* dTD  */ [S, S, X, X, X, X, D, D, I, X, X, X, X, X, X, X, X, X, X, X],
    /* dT   */ [S, S, X, X, X, X, X, X, X, I, T, T, T, T, T, T, T, X, X, X],
    /* tim  */ [S, S, X, X, X, X, X, X, X, X, I, X, X, X, X, X, X, X, X, X],
    /* dat  */ [S, S, X, X, X, X, X, X, X, T, X, I, T, T, T, T, T, X, X, X],
    /* gYM  */ [S, S, X, X, X, X, X, X, X, X, X, X, I, X, X, X, X, X, X, X],
    /* gY   */ [S, S, X, X, X, X, X, X, X, X, X, X, X, I, X, X, X, X, X, X],
    /* gMD  */ [S, S, X, X, X, X, X, X, X, X, X, X, X, X, I, X, X, X, X, X],
    /* gD   */ [S, S, X, X, X, X, X, X, X, X, X, X, X, X, X, I, X, X, X, X],
    /* gM   */ [S, S, X, X, X, X, X, X, X, X, X, X, X, X, X, X, I, X, X, X],
    /* bool */ [S, S, U, U, U, U, X, X, X, X, X, X, X, X, X, X, X, I, X, X],
    /* aURI */ [S, S, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, I, X],
    /* QN   */ [S, S, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, X, I],
];

/// Rule governing a cast from `source` to `target`.
pub fn cast_rule(source: AtomicKind, target: AtomicKind) -> CastRule {
    CAST_MATRIX[Primitive::of(source) as usize][Primitive::of(target) as usize]
}

/// Whether a cast between the two types can succeed for some value.
pub fn is_castable(source: AtomicKind, target: AtomicKind) -> bool {
    cast_rule(source, target) != CastRule::Forbidden
}

/// Cast with only the reserved namespace prefixes in scope.
pub fn cast(value: &XdmAtomicValue, target: AtomicKind) -> Result<XdmAtomicValue, Error> {
    cast_with(value, target, None)
}

pub fn cast_with(
    value: &XdmAtomicValue,
    target: AtomicKind,
    namespaces: Option<&NamespaceBindings>,
) -> Result<XdmAtomicValue, Error> {
    let source = value.kind();
    let rule = cast_rule(source, target);
    tracing::trace!(from = source.qname_str(), to = target.qname_str(), ?rule, "cast");
    let converted = match rule {
        CastRule::Forbidden => {
            tracing::debug!(
                from = source.qname_str(),
                to = target.qname_str(),
                "cast rejected by matrix"
            );
            return Err(Error::illegal_cast(source, target));
        }
        CastRule::Identity => value.clone(),
        CastRule::ToString => {
            let text = value.string_value();
            if target == AtomicKind::UntypedAtomic {
                XdmAtomicValue::UntypedAtomic(text)
            } else {
                XdmAtomicValue::String(text)
            }
        }
        CastRule::Parse => {
            XdmAtomicValue::from_lexical_in(target, &value.string_value(), namespaces)?
        }
        CastRule::Numeric => convert_numeric(value, target)?,
        CastRule::Duration => convert_duration(value, target)?,
        CastRule::Project => project_temporal(value, target)?,
    };
    restrict(converted, target)
}

/// Cast to a type named by expanded QName. `xs:anyAtomicType` and
/// `xs:NOTATION` are abstract; other unknown names raise `XPST0051`.
pub fn cast_to_name(
    value: &XdmAtomicValue,
    target: &ExpandedName,
    namespaces: Option<&NamespaceBindings>,
) -> Result<XdmAtomicValue, Error> {
    if let Some(kind) = AtomicKind::from_expanded(target) {
        return cast_with(value, kind, namespaces);
    }
    if target.ns_uri.as_deref() == Some(crate::consts::XS)
        && matches!(target.local.as_str(), "anyAtomicType" | "NOTATION" | "anySimpleType")
    {
        return Err(Error::from_code(
            ErrorCode::XPST0080,
            format!("cannot cast to abstract type xs:{}", target.local),
        ));
    }
    Err(Error::from_code(
        ErrorCode::XPST0051,
        format!("unknown atomic type {target}"),
    ))
}

/// Relabel integers with the target's integer kind, enforcing its facet.
fn restrict(value: XdmAtomicValue, target: AtomicKind) -> Result<XdmAtomicValue, Error> {
    match (value, target) {
        (XdmAtomicValue::Integer(i), AtomicKind::Integer(kind)) if i.kind() != kind => {
            Ok(XdmAtomicValue::Integer(XsInteger::new(kind, i.value())?))
        }
        (value, _) => Ok(value),
    }
}

fn integer_overflow(what: impl std::fmt::Display) -> Error {
    Error::from_code(
        ErrorCode::FOCA0003,
        format!("value {what} too large for xs:integer"),
    )
}

fn decimal_overflow(what: impl std::fmt::Display) -> Error {
    Error::from_code(
        ErrorCode::FOCA0001,
        format!("value {what} too large for xs:decimal"),
    )
}

fn not_finite(target: AtomicKind, v: f64) -> Error {
    Error::from_code(
        ErrorCode::FOCA0002,
        format!("cannot cast {} to {}", crate::xdm::format_double(v), target.qname_str()),
    )
}

fn float_to_integer(v: f64, target: AtomicKind) -> Result<i128, Error> {
    if !v.is_finite() {
        return Err(not_finite(target, v));
    }
    let truncated = v.trunc();
    // i128::MAX as f64 rounds up to 2^127, which itself does not fit
    if truncated >= i128::MAX as f64 || truncated < i128::MIN as f64 {
        return Err(integer_overflow(v));
    }
    Ok(truncated as i128)
}

fn convert_numeric(value: &XdmAtomicValue, target: AtomicKind) -> Result<XdmAtomicValue, Error> {
    use XdmAtomicValue as V;
    let out = match (value, target) {
        (V::Integer(i), AtomicKind::Boolean) => V::Boolean(i.value() != 0),
        (V::Decimal(d), AtomicKind::Boolean) => V::Boolean(!d.is_zero()),
        (V::Float(f), AtomicKind::Boolean) => V::Boolean(*f != 0.0 && !f.is_nan()),
        (V::Double(d), AtomicKind::Boolean) => V::Boolean(*d != 0.0 && !d.is_nan()),

        (V::Integer(i), AtomicKind::Double) => V::Double(i.value() as f64),
        (V::Decimal(d), AtomicKind::Double) => V::Double(d.to_f64().unwrap_or(f64::NAN)),
        (V::Float(f), AtomicKind::Double) => V::Double(f64::from(*f)),
        (V::Boolean(b), AtomicKind::Double) => V::Double(if *b { 1.0 } else { 0.0 }),

        (V::Integer(i), AtomicKind::Float) => V::Float(i.value() as f32),
        (V::Decimal(d), AtomicKind::Float) => V::Float(d.to_f32().unwrap_or(f32::NAN)),
        (V::Double(d), AtomicKind::Float) => V::Float(*d as f32),
        (V::Boolean(b), AtomicKind::Float) => V::Float(if *b { 1.0 } else { 0.0 }),

        (V::Integer(i), AtomicKind::Decimal) => {
            V::Decimal(int_to_decimal(i.value()).ok_or_else(|| decimal_overflow(i))?)
        }
        (V::Float(f), AtomicKind::Decimal) => {
            let v = f64::from(*f);
            if !v.is_finite() {
                return Err(not_finite(target, v));
            }
            V::Decimal(Decimal::from_f32(*f).ok_or_else(|| decimal_overflow(v))?)
        }
        (V::Double(d), AtomicKind::Decimal) => {
            if !d.is_finite() {
                return Err(not_finite(target, *d));
            }
            V::Decimal(Decimal::from_f64(*d).ok_or_else(|| decimal_overflow(d))?)
        }
        (V::Boolean(b), AtomicKind::Decimal) => V::Decimal(Decimal::from(u8::from(*b))),

        (V::Decimal(d), AtomicKind::Integer(_)) => {
            V::integer(d.trunc().to_i128().ok_or_else(|| integer_overflow(d))?)
        }
        (V::Float(f), AtomicKind::Integer(_)) => V::integer(float_to_integer(f64::from(*f), target)?),
        (V::Double(d), AtomicKind::Integer(_)) => V::integer(float_to_integer(*d, target)?),
        (V::Boolean(b), AtomicKind::Integer(_)) => V::integer(i128::from(u8::from(*b))),

        _ => return Err(Error::illegal_cast(value.kind(), target)),
    };
    Ok(out)
}

fn convert_duration(value: &XdmAtomicValue, target: AtomicKind) -> Result<XdmAtomicValue, Error> {
    let d = value
        .as_duration()
        .ok_or_else(|| Error::illegal_cast(value.kind(), target))?;
    Ok(match target {
        AtomicKind::Duration => XdmAtomicValue::Duration(d),
        AtomicKind::YearMonthDuration => XdmAtomicValue::YearMonthDuration(d.year_month()),
        AtomicKind::DayTimeDuration => XdmAtomicValue::DayTimeDuration(d.day_time()),
        _ => return Err(Error::illegal_cast(value.kind(), target)),
    })
}

fn project_temporal(value: &XdmAtomicValue, target: AtomicKind) -> Result<XdmAtomicValue, Error> {
    let dt = match value {
        XdmAtomicValue::DateTime(dt) => *dt,
        XdmAtomicValue::Date(d) => d.to_date_time(),
        other => return Err(Error::illegal_cast(other.kind(), target)),
    };
    let date: XsDate = dt.date();
    let tz = dt.timezone();
    let out = match target {
        AtomicKind::DateTime => XdmAtomicValue::DateTime(dt),
        AtomicKind::Date => XdmAtomicValue::Date(date),
        AtomicKind::Time => XdmAtomicValue::Time(XsTime::new(dt.value().time(), tz)),
        AtomicKind::GYearMonth => {
            XdmAtomicValue::GYearMonth(fragment(GYearMonth::new(date.year(), date.month(), tz))?)
        }
        AtomicKind::GYear => XdmAtomicValue::GYear(fragment(GYear::new(date.year(), tz))?),
        AtomicKind::GMonthDay => {
            XdmAtomicValue::GMonthDay(fragment(GMonthDay::new(date.month(), date.day(), tz))?)
        }
        AtomicKind::GDay => XdmAtomicValue::GDay(fragment(GDay::new(date.day(), tz))?),
        AtomicKind::GMonth => XdmAtomicValue::GMonth(fragment(GMonth::new(date.month(), tz))?),
        _ => return Err(Error::illegal_cast(value.kind(), target)),
    };
    Ok(out)
}

fn fragment<T>(value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| Error::from_code(ErrorCode::FODT0001, "date component out of range"))
}
