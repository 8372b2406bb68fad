use super::common::{expect_arg, first_atomic, single};
use crate::engine::runtime::{CallCtx, Error, ErrorCode};
use crate::model::XdmNode;
use crate::xdm::{XdmAtomicValue, XdmSequence, split_qname_lexical};

type QNameParts = (Option<String>, Option<String>, String);

fn get_qname<N>(seq: &XdmSequence<N>) -> Result<Option<QNameParts>, Error> {
    expect_arg(seq, "xs:QName", |a| match a {
        XdmAtomicValue::QName {
            ns_uri,
            prefix,
            local,
        } => Some((ns_uri.clone(), prefix.clone(), local.clone())),
        _ => None,
    })
}

pub(super) fn qname_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let uri = first_atomic(&args[0])
        .map(XdmAtomicValue::string_value)
        .filter(|s| !s.is_empty());
    let lexical = first_atomic(&args[1])
        .map(XdmAtomicValue::string_value)
        .unwrap_or_default();
    let (prefix, local) = split_qname_lexical(&lexical).ok_or_else(|| {
        Error::from_code(ErrorCode::FOCA0002, format!("invalid lexical QName '{lexical}'"))
    })?;
    if prefix.is_some() && uri.is_none() {
        return Err(Error::from_code(
            ErrorCode::FOCA0002,
            format!("prefixed QName '{lexical}' requires a namespace URI"),
        ));
    }
    Ok(single(XdmAtomicValue::QName {
        ns_uri: uri,
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
    }))
}

pub(super) fn local_name_from_qname_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_qname(&args[0])?.map_or_else(Vec::new, |(_, _, local)| {
        single(XdmAtomicValue::String(local))
    }))
}

pub(super) fn prefix_from_qname_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_qname(&args[0])?
        .and_then(|(_, prefix, _)| prefix)
        .map_or_else(Vec::new, |p| single(XdmAtomicValue::String(p))))
}

/// Names in no namespace yield the zero-length URI.
pub(super) fn namespace_uri_from_qname_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_qname(&args[0])?.map_or_else(Vec::new, |(ns, _, _)| {
        single(XdmAtomicValue::AnyUri(ns.unwrap_or_default()))
    }))
}
