use super::common::{first_atomic, integer, single};
use super::conversion::atomize;
use crate::engine::runtime::{CallCtx, Error, ErrorCode};
use crate::model::XdmNode;
use crate::xdm::{XdmAtomicValue, XdmItem, XdmSequence};

pub(super) fn string_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let text = match args[0].first() {
        None => String::new(),
        Some(XdmItem::Node(n)) => n.string_value(),
        Some(XdmItem::Atomic(a)) => a.string_value(),
    };
    Ok(single(XdmAtomicValue::String(text)))
}

pub(super) fn data_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(atomize(&args[0]).into_iter().map(XdmItem::Atomic).collect())
}

/// Effective boolean value of a sequence.
pub fn effective_boolean_value<N: XdmNode>(seq: &[XdmItem<N>]) -> Result<bool, Error> {
    let first = match seq.first() {
        None => return Ok(false),
        Some(XdmItem::Node(_)) => return Ok(true),
        Some(XdmItem::Atomic(a)) => a,
    };
    if seq.len() > 1 {
        return Err(Error::from_code(
            ErrorCode::FORG0006,
            "effective boolean value is not defined for a sequence of two or more atomic values",
        ));
    }
    match first {
        XdmAtomicValue::Boolean(b) => Ok(*b),
        XdmAtomicValue::String(s) | XdmAtomicValue::UntypedAtomic(s) | XdmAtomicValue::AnyUri(s) => {
            Ok(!s.is_empty())
        }
        XdmAtomicValue::Integer(i) => Ok(i.value() != 0),
        XdmAtomicValue::Decimal(d) => Ok(!d.is_zero()),
        XdmAtomicValue::Float(f) => Ok(*f != 0.0 && !f.is_nan()),
        XdmAtomicValue::Double(d) => Ok(*d != 0.0 && !d.is_nan()),
        other => Err(Error::from_code(
            ErrorCode::FORG0006,
            format!("effective boolean value is not defined for {}", other.type_name()),
        )),
    }
}

pub(super) fn boolean_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(single(XdmAtomicValue::Boolean(effective_boolean_value(&args[0])?)))
}

/// Codepoint collation only.
pub(super) fn compare_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let (Some(a), Some(b)) = (first_atomic(&args[0]), first_atomic(&args[1])) else {
        return Ok(vec![]);
    };
    let ordering = a.string_value().cmp(&b.string_value());
    Ok(integer(ordering as i8))
}
