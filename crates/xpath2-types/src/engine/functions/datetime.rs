use super::common::{expect_arg, integer, single};
use crate::engine::runtime::{CallCtx, Error};
use crate::model::XdmNode;
use crate::temporal::duration::DayTimeDuration;
use crate::temporal::{Temporal, XsDate, XsDateTime, XsTime};
use crate::xdm::{XdmAtomicValue, XdmSequence};
use chrono::FixedOffset;

fn get_datetime<N>(seq: &XdmSequence<N>) -> Result<Option<XsDateTime>, Error> {
    expect_arg(seq, "xs:dateTime", |a| match a {
        XdmAtomicValue::DateTime(v) => Some(*v),
        _ => None,
    })
}

fn get_date<N>(seq: &XdmSequence<N>) -> Result<Option<XsDate>, Error> {
    expect_arg(seq, "xs:date", |a| match a {
        XdmAtomicValue::Date(v) => Some(*v),
        _ => None,
    })
}

fn get_time<N>(seq: &XdmSequence<N>) -> Result<Option<XsTime>, Error> {
    expect_arg(seq, "xs:time", |a| match a {
        XdmAtomicValue::Time(v) => Some(*v),
        _ => None,
    })
}

/// Timezone argument of the adjust functions: absent at arity 1 means the
/// implicit timezone, an empty sequence at arity 2 means "remove".
fn target_timezone<N>(ctx: &CallCtx<'_>, args: &[XdmSequence<N>]) -> Result<Option<FixedOffset>, Error> {
    let Some(arg) = args.get(1) else {
        return Ok(Some(ctx.implicit_timezone()));
    };
    let duration = expect_arg(arg, "xs:dayTimeDuration", |a| match a {
        XdmAtomicValue::DayTimeDuration(d) => Some(*d),
        _ => None,
    })?;
    duration.map(|d| d.to_timezone()).transpose()
}

fn timezone_value<N>(tz: Option<FixedOffset>) -> XdmSequence<N> {
    match tz {
        Some(tz) => single(XdmAtomicValue::DayTimeDuration(DayTimeDuration::from_timezone(tz))),
        None => vec![],
    }
}

pub(super) fn date_time_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let (Some(date), Some(time)) = (get_date(&args[0])?, get_time(&args[1])?) else {
        return Ok(vec![]);
    };
    let dt = XsDateTime::from_date_and_time(&date, &time)?;
    Ok(single(XdmAtomicValue::DateTime(dt)))
}

fn now(ctx: &CallCtx<'_>) -> XsDateTime {
    let now = ctx.static_ctx.current_date_time;
    XsDateTime::new(now.naive_local(), Some(*now.offset()))
}

pub(super) fn current_datetime_fn<N: XdmNode>(
    ctx: &CallCtx<'_>,
    _args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(single(XdmAtomicValue::DateTime(now(ctx))))
}

pub(super) fn current_date_fn<N: XdmNode>(
    ctx: &CallCtx<'_>,
    _args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(single(XdmAtomicValue::Date(now(ctx).date())))
}

pub(super) fn current_time_fn<N: XdmNode>(
    ctx: &CallCtx<'_>,
    _args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(single(XdmAtomicValue::Time(now(ctx).time())))
}

pub(super) fn implicit_timezone_fn<N: XdmNode>(
    ctx: &CallCtx<'_>,
    _args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(timezone_value(Some(ctx.implicit_timezone())))
}

pub(super) fn year_from_datetime_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_datetime(&args[0])?.map_or_else(Vec::new, |dt| integer(dt.year())))
}

pub(super) fn month_from_datetime_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_datetime(&args[0])?.map_or_else(Vec::new, |dt| integer(dt.month())))
}

pub(super) fn day_from_datetime_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_datetime(&args[0])?.map_or_else(Vec::new, |dt| integer(dt.day())))
}

pub(super) fn hours_from_datetime_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_datetime(&args[0])?.map_or_else(Vec::new, |dt| integer(dt.hour())))
}

pub(super) fn minutes_from_datetime_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_datetime(&args[0])?.map_or_else(Vec::new, |dt| integer(dt.minute())))
}

pub(super) fn seconds_from_datetime_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_datetime(&args[0])?
        .map_or_else(Vec::new, |dt| single(XdmAtomicValue::Decimal(dt.second().normalize()))))
}

pub(super) fn timezone_from_datetime_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_datetime(&args[0])?.map_or_else(Vec::new, |dt| timezone_value(dt.timezone())))
}

pub(super) fn year_from_date_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_date(&args[0])?.map_or_else(Vec::new, |d| integer(d.year())))
}

pub(super) fn month_from_date_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_date(&args[0])?.map_or_else(Vec::new, |d| integer(d.month())))
}

pub(super) fn day_from_date_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_date(&args[0])?.map_or_else(Vec::new, |d| integer(d.day())))
}

pub(super) fn timezone_from_date_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_date(&args[0])?.map_or_else(Vec::new, |d| timezone_value(d.timezone())))
}

pub(super) fn hours_from_time_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_time(&args[0])?.map_or_else(Vec::new, |t| integer(t.hour())))
}

pub(super) fn minutes_from_time_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_time(&args[0])?.map_or_else(Vec::new, |t| integer(t.minute())))
}

pub(super) fn seconds_from_time_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_time(&args[0])?
        .map_or_else(Vec::new, |t| single(XdmAtomicValue::Decimal(t.second().normalize()))))
}

pub(super) fn timezone_from_time_fn<N: XdmNode>(
    _ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    Ok(get_time(&args[0])?.map_or_else(Vec::new, |t| timezone_value(t.timezone())))
}

pub(super) fn adjust_datetime_to_timezone_fn<N: XdmNode>(
    ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let Some(dt) = get_datetime(&args[0])? else {
        return Ok(vec![]);
    };
    let tz = target_timezone(ctx, args)?;
    Ok(single(XdmAtomicValue::DateTime(dt.adjust_to_timezone(tz)?)))
}

pub(super) fn adjust_date_to_timezone_fn<N: XdmNode>(
    ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let Some(date) = get_date(&args[0])? else {
        return Ok(vec![]);
    };
    let tz = target_timezone(ctx, args)?;
    Ok(single(XdmAtomicValue::Date(date.adjust_to_timezone(tz)?)))
}

pub(super) fn adjust_time_to_timezone_fn<N: XdmNode>(
    ctx: &CallCtx<'_>,
    args: &[XdmSequence<N>],
) -> Result<XdmSequence<N>, Error> {
    let Some(time) = get_time(&args[0])? else {
        return Ok(vec![]);
    };
    let tz = target_timezone(ctx, args)?;
    Ok(single(XdmAtomicValue::Time(time.adjust_to_timezone(tz)?)))
}
