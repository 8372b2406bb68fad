use super::common::{first_atomic, single};
use crate::engine::runtime::{CallCtx, Error, ErrorCode};
use crate::model::XdmNode;
use crate::xdm::{XdmAtomicValue, XdmSequence};
use rust_decimal::{Decimal, RoundingStrategy};

fn overflow() -> Error {
    Error::from_code(ErrorCode::FOAR0002, "numeric overflow")
}

/// Apply `op` to a numeric argument; derived integer types come back as
/// plain `xs:integer`.
fn unary_numeric<N>(
    args: &[XdmSequence<N>],
    int_op: impl FnOnce(i128) -> Result<i128, Error>,
    dec_op: impl FnOnce(Decimal) -> Result<Decimal, Error>,
    dbl_op: impl FnOnce(f64) -> f64,
) -> Result<XdmSequence<N>, Error> {
    let Some(value) = first_atomic(&args[0]) else {
        return Ok(vec![]);
    };
    let out = match value {
        XdmAtomicValue::Integer(i) => XdmAtomicValue::integer(int_op(i.value())?),
        XdmAtomicValue::Decimal(d) => XdmAtomicValue::Decimal(dec_op(*d)?.normalize()),
        XdmAtomicValue::Float(f) => XdmAtomicValue::Float(dbl_op(f64::from(*f)) as f32),
        XdmAtomicValue::Double(d) => XdmAtomicValue::Double(dbl_op(*d)),
        other => {
            return Err(Error::type_error(format!(
                "expected a numeric value, got {}",
                other.type_name()
            )));
        }
    };
    Ok(single(out))
}

pub(super) fn abs_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    unary_numeric(
        args,
        |i| i.checked_abs().ok_or_else(overflow),
        |d| Ok(d.abs()),
        f64::abs,
    )
}

pub(super) fn ceiling_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    unary_numeric(args, Ok, |d| Ok(d.ceil()), f64::ceil)
}

pub(super) fn floor_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    unary_numeric(args, Ok, |d| Ok(d.floor()), f64::floor)
}

/// Round half toward positive infinity; keeps the sign of negative zero results.
fn round_double(x: f64) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }
    let r = (x + 0.5).floor();
    if r == 0.0 && x < 0.0 { -0.0 } else { r }
}

pub(super) fn round_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    unary_numeric(
        args,
        Ok,
        |d| {
            d.checked_add(Decimal::new(5, 1))
                .map(|v| v.floor())
                .ok_or_else(overflow)
        },
        round_double,
    )
}

fn round_half_even_double(x: f64, precision: i32) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }
    let scale = 10f64.powi(precision);
    if scale == 0.0 {
        return 0.0f64.copysign(x);
    }
    let scaled = x * scale;
    if !scaled.is_finite() {
        return x;
    }
    let rounded = scaled.round_ties_even() / scale;
    if rounded == 0.0 && x < 0.0 { -0.0 } else { rounded }
}

fn round_half_even_decimal(d: Decimal, precision: i32) -> Result<Decimal, Error> {
    if precision >= 0 {
        let dp = u32::try_from(precision).unwrap_or(u32::MAX).min(28);
        return Ok(d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven));
    }
    let digits = -precision;
    if digits > 28 {
        // beyond the decimal range every value rounds to zero
        return Ok(Decimal::ZERO);
    }
    let mut factor = Decimal::ONE;
    for _ in 0..digits {
        factor = factor.checked_mul(Decimal::TEN).ok_or_else(overflow)?;
    }
    let scaled = d.checked_div(factor).ok_or_else(overflow)?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .checked_mul(factor)
        .ok_or_else(overflow)
}

fn round_half_even_integer(i: i128, precision: i32) -> Result<i128, Error> {
    if precision >= 0 {
        return Ok(i);
    }
    let Some(factor) = u32::try_from(-i64::from(precision))
        .ok()
        .and_then(|p| 10i128.checked_pow(p))
    else {
        // rounding to more digits than i128 holds always yields zero
        return Ok(0);
    };
    let quotient = i / factor;
    let remainder = i % factor;
    let twice = remainder.abs() * 2;
    let step = i.signum();
    let q = match twice.cmp(&factor) {
        core::cmp::Ordering::Less => quotient,
        core::cmp::Ordering::Greater => quotient + step,
        core::cmp::Ordering::Equal if quotient % 2 == 0 => quotient,
        core::cmp::Ordering::Equal => quotient + step,
    };
    q.checked_mul(factor).ok_or_else(overflow)
}

pub(super) fn round_half_to_even_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let precision = match args.get(1).and_then(first_atomic).and_then(XdmAtomicValue::as_integer) {
        Some(p) => i32::try_from(p.clamp(-i128::from(i32::MAX), i128::from(i32::MAX))).unwrap_or(0),
        None => 0,
    };
    unary_numeric(
        args,
        |i| round_half_even_integer(i, precision),
        |d| round_half_even_decimal(d, precision),
        |x| round_half_even_double(x, precision),
    )
}
