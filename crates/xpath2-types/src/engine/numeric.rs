//! Numeric classification and promotion shared by arithmetic and comparison.

use crate::xdm::XdmAtomicValue;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Numeric classification carrying the promoted value.
#[derive(Clone, Copy, Debug)]
pub(crate) enum NumKind {
    Int(i128),
    Dec(Decimal),
    Float(f32),
    Double(f64),
}

impl NumKind {
    /// Convert any numeric kind to f64 (lossy for Decimal).
    pub(crate) fn to_f64(self) -> f64 {
        match self {
            NumKind::Int(i) => i as f64,
            NumKind::Dec(d) => d.to_f64().unwrap_or(f64::NAN),
            NumKind::Float(f) => f as f64,
            NumKind::Double(d) => d,
        }
    }

    fn to_f32(self) -> f32 {
        match self {
            NumKind::Int(i) => i as f32,
            NumKind::Dec(d) => d.to_f32().unwrap_or(f32::NAN),
            NumKind::Float(f) => f,
            NumKind::Double(d) => d as f32,
        }
    }

    pub(crate) fn into_atomic(self) -> XdmAtomicValue {
        match self {
            NumKind::Int(i) => XdmAtomicValue::integer(i),
            NumKind::Dec(d) => XdmAtomicValue::Decimal(d),
            NumKind::Float(f) => XdmAtomicValue::Float(f),
            NumKind::Double(d) => XdmAtomicValue::Double(d),
        }
    }
}

pub(crate) fn int_to_decimal(i: i128) -> Option<Decimal> {
    Decimal::try_from_i128_with_scale(i, 0).ok()
}

/// Classify an XDM atomic value into a [`NumKind`], if it is numeric.
pub(crate) fn classify(v: &XdmAtomicValue) -> Option<NumKind> {
    match v {
        XdmAtomicValue::Integer(i) => Some(NumKind::Int(i.value())),
        XdmAtomicValue::Decimal(d) => Some(NumKind::Dec(*d)),
        XdmAtomicValue::Float(f) => Some(NumKind::Float(*f)),
        XdmAtomicValue::Double(d) => Some(NumKind::Double(*d)),
        _ => None,
    }
}

/// Promote two values to their common type: integer+integer stays integer,
/// integer+decimal becomes decimal, float wins over both, double wins over all.
/// Integers beyond the decimal range promote to double.
pub(crate) fn unify_numeric(a: NumKind, b: NumKind) -> (NumKind, NumKind) {
    use NumKind::*;
    match (a, b) {
        (Double(x), y) => (Double(x), Double(y.to_f64())),
        (y, Double(x)) => (Double(y.to_f64()), Double(x)),
        (Float(x), y) => (Float(x), Float(y.to_f32())),
        (y, Float(x)) => (Float(y.to_f32()), Float(x)),
        (Dec(x), Dec(y)) => (Dec(x), Dec(y)),
        (Dec(x), Int(y)) => match int_to_decimal(y) {
            Some(y) => (Dec(x), Dec(y)),
            None => (Double(a.to_f64()), Double(b.to_f64())),
        },
        (Int(x), Dec(y)) => match int_to_decimal(x) {
            Some(x) => (Dec(x), Dec(y)),
            None => (Double(a.to_f64()), Double(b.to_f64())),
        },
        (Int(x), Int(y)) => (Int(x), Int(y)),
    }
}
