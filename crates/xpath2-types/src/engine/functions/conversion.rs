//! Function argument conversion.
//!
//! Applied to every argument before a body runs, in this order: atomization,
//! cardinality check, subtype acceptance, untyped casting, numeric and URI
//! promotion, and finally an attempted cast whose failure is a type error.

use super::{FunctionSignature, ItemTypeSpec, ParamTypeSpec};
use crate::engine::casting::cast_with;
use crate::engine::runtime::{Error, ErrorCode, ErrorKind, StaticContext};
use crate::model::XdmNode;
use crate::xdm::{AtomicKind, XdmAtomicValue, XdmItem, XdmSequence};
use std::sync::Arc;

/// Replace nodes by their typed values.
pub fn atomize<N: XdmNode>(seq: &[XdmItem<N>]) -> Vec<XdmAtomicValue> {
    let mut out = Vec::with_capacity(seq.len());
    for item in seq {
        match item {
            XdmItem::Atomic(a) => out.push(a.clone()),
            XdmItem::Node(n) => out.extend(n.typed_value()),
        }
    }
    out
}

pub fn convert_arguments<N: XdmNode>(
    signature: &FunctionSignature,
    args: &[XdmSequence<N>],
    ctx: &StaticContext,
) -> Result<Vec<XdmSequence<N>>, Error> {
    signature
        .params
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (spec, arg))| convert_argument(signature, index, spec, arg, ctx))
        .collect()
}

fn convert_argument<N: XdmNode>(
    signature: &FunctionSignature,
    index: usize,
    spec: &ParamTypeSpec,
    arg: &XdmSequence<N>,
    ctx: &StaticContext,
) -> Result<XdmSequence<N>, Error> {
    if spec.item == ItemTypeSpec::AnyItem {
        check_cardinality(signature, index, spec, arg.len())?;
        return Ok(arg.clone());
    }
    let atoms = atomize(arg);
    check_cardinality(signature, index, spec, atoms.len())?;
    atoms
        .into_iter()
        .map(|atom| convert_item(signature, index, spec, atom, ctx).map(XdmItem::Atomic))
        .collect()
}

fn check_cardinality(
    signature: &FunctionSignature,
    index: usize,
    spec: &ParamTypeSpec,
    len: usize,
) -> Result<(), Error> {
    if spec.occurrence.admits(len) {
        return Ok(());
    }
    Err(Error::new(
        ErrorCode::XPTY0004,
        ErrorKind::Cardinality,
        format!(
            "argument {} of {}: expected {}, got a sequence of {} items",
            index + 1,
            signature.display_name(),
            spec,
            len
        ),
    ))
}

/// Promotions XPath allows without a cast being "attempted".
fn promotes(source: AtomicKind, target: AtomicKind) -> bool {
    match target {
        AtomicKind::Double => matches!(
            source,
            AtomicKind::Float | AtomicKind::Decimal | AtomicKind::Integer(_)
        ),
        AtomicKind::Float => matches!(source, AtomicKind::Decimal | AtomicKind::Integer(_)),
        AtomicKind::String => source == AtomicKind::AnyUri,
        _ => false,
    }
}

fn convert_item(
    signature: &FunctionSignature,
    index: usize,
    spec: &ParamTypeSpec,
    atom: XdmAtomicValue,
    ctx: &StaticContext,
) -> Result<XdmAtomicValue, Error> {
    let target = match spec.item {
        ItemTypeSpec::AnyItem | ItemTypeSpec::AnyAtomic => return Ok(atom),
        ItemTypeSpec::Numeric if atom.is_numeric() => return Ok(atom),
        ItemTypeSpec::Numeric => AtomicKind::Double,
        ItemTypeSpec::Atomic(kind) if atom.kind().derives_from(kind) => return Ok(atom),
        ItemTypeSpec::Atomic(kind) => kind,
    };
    let source = atom.kind();
    let namespaces = Some(&ctx.namespaces);
    if source == AtomicKind::UntypedAtomic || promotes(source, target) {
        return cast_with(&atom, target, namespaces);
    }
    cast_with(&atom, target, namespaces).map_err(|cause| {
        tracing::debug!(
            function = %signature.display_name(),
            argument = index + 1,
            from = source.qname_str(),
            to = target.qname_str(),
            "argument conversion failed"
        );
        Error::type_error(format!(
            "argument {} of {}: expected {}, got {}",
            index + 1,
            signature.display_name(),
            spec,
            source.qname_str()
        ))
        .with_source(Some(Arc::new(cause) as Arc<dyn std::error::Error + Send + Sync>))
    })
}
