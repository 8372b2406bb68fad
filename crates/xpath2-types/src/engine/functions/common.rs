use crate::engine::runtime::Error;
use crate::xdm::{XdmAtomicValue, XdmItem, XdmSequence};

/// First item of an already-converted argument.
pub(super) fn first_atomic<N>(seq: &XdmSequence<N>) -> Option<&XdmAtomicValue> {
    match seq.first()? {
        XdmItem::Atomic(a) => Some(a),
        XdmItem::Node(_) => None,
    }
}

/// Extract an optional typed argument; anything but the expected variant is
/// a type error.
pub(super) fn expect_arg<N, T>(
    seq: &XdmSequence<N>,
    expected: &str,
    extract: impl FnOnce(&XdmAtomicValue) -> Option<T>,
) -> Result<Option<T>, Error> {
    let Some(first) = seq.first() else {
        return Ok(None);
    };
    let found = match first {
        XdmItem::Atomic(a) => a,
        XdmItem::Node(_) => {
            return Err(Error::type_error(format!("expected {expected}, got a node")));
        }
    };
    extract(found)
        .map(Some)
        .ok_or_else(|| Error::type_error(format!("expected {expected}, got {}", found.type_name())))
}

pub(super) fn single<N>(value: XdmAtomicValue) -> XdmSequence<N> {
    vec![XdmItem::Atomic(value)]
}

pub(super) fn integer<N>(value: impl Into<i128>) -> XdmSequence<N> {
    single(XdmAtomicValue::integer(value.into()))
}
