//! Atomic value comparison for XPath 2.0 value and general comparisons.

use crate::engine::casting::cast;
use crate::engine::numeric::{NumKind, classify, unify_numeric};
use crate::engine::runtime::Error;
use crate::temporal::Temporal;
use crate::xdm::{AtomicKind, XdmAtomicValue};
use chrono::FixedOffset;
use core::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Le => "le",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Ge => "ge",
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, ComparisonOp::Eq | ComparisonOp::Ne)
    }
}

/// Outcome of relating two comparable values.
enum Relation {
    /// Totally ordered family.
    Ordered(Ordering),
    /// Numeric comparison involving NaN: every operator but `ne` is false.
    Unordered,
    /// Family that only defines equality.
    EqualityOnly(bool),
}

fn incomparable(a: &XdmAtomicValue, b: &XdmAtomicValue, op: ComparisonOp) -> Error {
    Error::type_error(format!(
        "cannot compare {} {} {}",
        a.type_name(),
        op.symbol(),
        b.type_name()
    ))
}

/// XPath value comparison (`eq`, `lt`, ...).
///
/// `xs:untypedAtomic` operands compare as strings. Values without a timezone
/// are placed on the timeline with `implicit_tz`.
pub fn compare_atomic(
    a: &XdmAtomicValue,
    b: &XdmAtomicValue,
    op: ComparisonOp,
    implicit_tz: FixedOffset,
) -> Result<bool, Error> {
    let relation = relate(a, b, implicit_tz)?.ok_or_else(|| incomparable(a, b, op))?;
    let result = match relation {
        Relation::Ordered(ord) => match op {
            ComparisonOp::Eq => ord == Ordering::Equal,
            ComparisonOp::Ne => ord != Ordering::Equal,
            ComparisonOp::Lt => ord == Ordering::Less,
            ComparisonOp::Le => ord != Ordering::Greater,
            ComparisonOp::Gt => ord == Ordering::Greater,
            ComparisonOp::Ge => ord != Ordering::Less,
        },
        Relation::Unordered => op == ComparisonOp::Ne,
        Relation::EqualityOnly(equal) => match op {
            ComparisonOp::Eq => equal,
            ComparisonOp::Ne => !equal,
            _ => return Err(incomparable(a, b, op)),
        },
    };
    Ok(result)
}

/// Shorthand for `compare_atomic(a, b, Eq, tz)`.
pub fn value_eq(a: &XdmAtomicValue, b: &XdmAtomicValue, implicit_tz: FixedOffset) -> Result<bool, Error> {
    compare_atomic(a, b, ComparisonOp::Eq, implicit_tz)
}

/// General comparison (`=`, `<`, ...) of two atomized items.
///
/// An `xs:untypedAtomic` operand is cast to `xs:double` against a numeric,
/// to `xs:string` against a string or another untyped value, and to the
/// other operand's type otherwise.
pub fn general_compare_atomic(
    a: &XdmAtomicValue,
    b: &XdmAtomicValue,
    op: ComparisonOp,
    implicit_tz: FixedOffset,
) -> Result<bool, Error> {
    let a_untyped = matches!(a, XdmAtomicValue::UntypedAtomic(_));
    let b_untyped = matches!(b, XdmAtomicValue::UntypedAtomic(_));
    match (a_untyped, b_untyped) {
        (true, false) => {
            let a = cast(a, general_target(b.kind()))?;
            compare_atomic(&a, b, op, implicit_tz)
        }
        (false, true) => {
            let b = cast(b, general_target(a.kind()))?;
            compare_atomic(a, &b, op, implicit_tz)
        }
        _ => compare_atomic(a, b, op, implicit_tz),
    }
}

fn general_target(other: AtomicKind) -> AtomicKind {
    if other.is_numeric() {
        AtomicKind::Double
    } else if other.is_string_like() {
        AtomicKind::String
    } else {
        other
    }
}

/// `None` when the two values belong to different comparison families.
fn relate(
    a: &XdmAtomicValue,
    b: &XdmAtomicValue,
    implicit_tz: FixedOffset,
) -> Result<Option<Relation>, Error> {
    use XdmAtomicValue as V;

    if let (Some(x), Some(y)) = (classify(a), classify(b)) {
        return Ok(Some(numeric_relation(x, y)));
    }
    if let (Some(x), Some(y)) = (string_like(a), string_like(b)) {
        return Ok(Some(Relation::Ordered(x.cmp(y))));
    }

    let relation = match (a, b) {
        (V::Boolean(x), V::Boolean(y)) => Relation::Ordered(x.cmp(y)),
        (
            V::QName {
                ns_uri: n1,
                local: l1,
                ..
            },
            V::QName {
                ns_uri: n2,
                local: l2,
                ..
            },
        ) => Relation::EqualityOnly(n1 == n2 && l1 == l2),
        (V::YearMonthDuration(x), V::YearMonthDuration(y)) => Relation::Ordered(x.cmp(y)),
        (V::DayTimeDuration(x), V::DayTimeDuration(y)) => Relation::Ordered(x.cmp(y)),
        (V::DateTime(x), V::DateTime(y)) => ordered_instants(x, y, implicit_tz)?,
        (V::Date(x), V::Date(y)) => ordered_instants(x, y, implicit_tz)?,
        (V::Time(x), V::Time(y)) => ordered_instants(x, y, implicit_tz)?,
        (V::GYearMonth(x), V::GYearMonth(y)) => equal_instants(x, y, implicit_tz)?,
        (V::GYear(x), V::GYear(y)) => equal_instants(x, y, implicit_tz)?,
        (V::GMonthDay(x), V::GMonthDay(y)) => equal_instants(x, y, implicit_tz)?,
        (V::GDay(x), V::GDay(y)) => equal_instants(x, y, implicit_tz)?,
        (V::GMonth(x), V::GMonth(y)) => equal_instants(x, y, implicit_tz)?,
        _ => match (a.as_duration(), b.as_duration()) {
            (Some(x), Some(y)) => {
                Relation::EqualityOnly(x.months() == y.months() && x.seconds() == y.seconds())
            }
            _ => return Ok(None),
        },
    };
    Ok(Some(relation))
}

fn string_like(v: &XdmAtomicValue) -> Option<&str> {
    match v {
        XdmAtomicValue::String(s) | XdmAtomicValue::AnyUri(s) | XdmAtomicValue::UntypedAtomic(s) => {
            Some(s.as_str())
        }
        _ => None,
    }
}

fn numeric_relation(a: NumKind, b: NumKind) -> Relation {
    let ord = match unify_numeric(a, b) {
        (NumKind::Int(x), NumKind::Int(y)) => Some(x.cmp(&y)),
        (NumKind::Dec(x), NumKind::Dec(y)) => Some(x.cmp(&y)),
        (NumKind::Float(x), NumKind::Float(y)) => x.partial_cmp(&y),
        (x, y) => x.to_f64().partial_cmp(&y.to_f64()),
    };
    ord.map_or(Relation::Unordered, Relation::Ordered)
}

fn ordered_instants<T: Temporal>(a: &T, b: &T, tz: FixedOffset) -> Result<Relation, Error> {
    Ok(Relation::Ordered(a.instant(tz)?.cmp(&b.instant(tz)?)))
}

fn equal_instants<T: Temporal>(a: &T, b: &T, tz: FixedOffset) -> Result<Relation, Error> {
    Ok(Relation::EqualityOnly(a.instant(tz)? == b.instant(tz)?))
}
