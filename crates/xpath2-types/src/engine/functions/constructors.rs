use super::common::{first_atomic, single};
use super::{FunctionLibrary, FunctionSignature, Occurrence, ParamTypeSpec};
use crate::engine::casting::cast_with;
use crate::engine::runtime::{CallCtx, Error};
use crate::model::XdmNode;
use crate::xdm::{AtomicKind, XdmSequence};

/// `xs:T($arg as xs:anyAtomicType?) as xs:T?` for every atomic kind.
pub(super) fn register<N: XdmNode + 'static>(lib: &mut FunctionLibrary<N>) {
    for kind in AtomicKind::all() {
        lib.register(
            FunctionSignature::new(
                kind.expanded_name(),
                vec![ParamTypeSpec::any_atomic(Occurrence::ZeroOrOne)],
            ),
            move |ctx, args| construct(kind, ctx, args),
        );
    }
}

pub(super) fn construct<N: XdmNode>(
    target: AtomicKind,
    ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let Some(value) = first_atomic(&args[0]) else {
        return Ok(vec![]);
    };
    let out = cast_with(value, target, Some(&ctx.static_ctx.namespaces))?;
    Ok(single(out))
}
