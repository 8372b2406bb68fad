use super::common::{expect_arg, integer, single};
use crate::engine::runtime::{CallCtx, Error};
use crate::model::XdmNode;
use crate::temporal::duration::XsDuration;
use crate::xdm::{XdmAtomicValue, XdmSequence};

fn get_duration<N>(seq: &XdmSequence<N>) -> Result<Option<XsDuration>, Error> {
    expect_arg(seq, "xs:duration", XdmAtomicValue::as_duration)
}

pub(super) fn years_from_duration_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_duration(&args[0])?.map_or_else(Vec::new, |d| integer(d.year_month().years_component())))
}

pub(super) fn months_from_duration_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_duration(&args[0])?.map_or_else(Vec::new, |d| integer(d.year_month().months_component())))
}

pub(super) fn days_from_duration_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_duration(&args[0])?.map_or_else(Vec::new, |d| integer(d.day_time().days_component())))
}

pub(super) fn hours_from_duration_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_duration(&args[0])?.map_or_else(Vec::new, |d| integer(d.day_time().hours_component())))
}

pub(super) fn minutes_from_duration_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_duration(&args[0])?
        .map_or_else(Vec::new, |d| integer(d.day_time().minutes_component())))
}

pub(super) fn seconds_from_duration_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_duration(&args[0])?.map_or_else(Vec::new, |d| {
        single(XdmAtomicValue::Decimal(d.day_time().seconds_component()))
    }))
}
