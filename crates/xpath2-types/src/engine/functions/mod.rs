//! Function library: signatures, dispatch and the built-in F&O families.
//!
//! The library is an immutable table built once by
//! [`FunctionLibrary::with_builtins`]; callers share it by reference. Every
//! call goes through [`conversion`] before the body sees its arguments, so
//! implementations can rely on their declared parameter types.

use crate::consts::{FNS, XS};
use crate::engine::runtime::{CallCtx, Error, ErrorCode, ErrorKind, StaticContext};
use crate::model::XdmNode;
use crate::xdm::{AtomicKind, ExpandedName, XdmSequence};
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

pub mod accessors;
mod common;
pub mod constructors;
pub mod conversion;
pub mod datetime;
pub mod durations;
pub mod numeric;
pub mod qnames;

pub type FunctionImpl<N> =
    Arc<dyn Fn(&CallCtx<'_>, &[XdmSequence<N>]) -> Result<XdmSequence<N>, Error> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occurrence {
    ExactlyOne,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Occurrence {
    pub fn admits(self, len: usize) -> bool {
        match self {
            Occurrence::ExactlyOne => len == 1,
            Occurrence::ZeroOrOne => len <= 1,
            Occurrence::ZeroOrMore => true,
            Occurrence::OneOrMore => len >= 1,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            Occurrence::ExactlyOne => "",
            Occurrence::ZeroOrOne => "?",
            Occurrence::ZeroOrMore => "*",
            Occurrence::OneOrMore => "+",
        }
    }
}

/// Item type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemTypeSpec {
    /// `item()`: nodes pass through without atomization.
    AnyItem,
    AnyAtomic,
    /// Any of the four numeric types, no promotion applied.
    Numeric,
    Atomic(AtomicKind),
}

impl fmt::Display for ItemTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemTypeSpec::AnyItem => f.write_str("item()"),
            ItemTypeSpec::AnyAtomic => f.write_str("xs:anyAtomicType"),
            ItemTypeSpec::Numeric => f.write_str("numeric"),
            ItemTypeSpec::Atomic(k) => f.write_str(k.qname_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamTypeSpec {
    pub item: ItemTypeSpec,
    pub occurrence: Occurrence,
}

impl ParamTypeSpec {
    pub fn new(item: ItemTypeSpec, occurrence: Occurrence) -> Self {
        Self { item, occurrence }
    }

    pub fn any_item(occurrence: Occurrence) -> Self {
        Self::new(ItemTypeSpec::AnyItem, occurrence)
    }

    pub fn any_atomic(occurrence: Occurrence) -> Self {
        Self::new(ItemTypeSpec::AnyAtomic, occurrence)
    }

    pub fn numeric(occurrence: Occurrence) -> Self {
        Self::new(ItemTypeSpec::Numeric, occurrence)
    }

    pub fn atomic(kind: AtomicKind, occurrence: Occurrence) -> Self {
        Self::new(ItemTypeSpec::Atomic(kind), occurrence)
    }

    pub fn string(occurrence: Occurrence) -> Self {
        Self::atomic(AtomicKind::String, occurrence)
    }

    pub fn integer(occurrence: Occurrence) -> Self {
        Self::atomic(AtomicKind::Integer(crate::xdm::IntegerKind::Integer), occurrence)
    }

    pub fn date(occurrence: Occurrence) -> Self {
        Self::atomic(AtomicKind::Date, occurrence)
    }

    pub fn time(occurrence: Occurrence) -> Self {
        Self::atomic(AtomicKind::Time, occurrence)
    }

    pub fn date_time(occurrence: Occurrence) -> Self {
        Self::atomic(AtomicKind::DateTime, occurrence)
    }

    pub fn duration(occurrence: Occurrence) -> Self {
        Self::atomic(AtomicKind::Duration, occurrence)
    }

    pub fn day_time_duration(occurrence: Occurrence) -> Self {
        Self::atomic(AtomicKind::DayTimeDuration, occurrence)
    }

    pub fn qname(occurrence: Occurrence) -> Self {
        Self::atomic(AtomicKind::QName, occurrence)
    }
}

impl fmt::Display for ParamTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.item, self.occurrence.indicator())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: ExpandedName,
    pub params: Vec<ParamTypeSpec>,
}

impl FunctionSignature {
    pub fn new(name: ExpandedName, params: Vec<ParamTypeSpec>) -> Self {
        Self { name, params }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `fn:local` / `xs:local` for the well-known namespaces.
    pub fn display_name(&self) -> String {
        match self.name.ns_uri.as_deref() {
            Some(FNS) => format!("fn:{}", self.name.local),
            Some(XS) => format!("xs:{}", self.name.local),
            _ => self.name.to_string(),
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.display_name())?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")
    }
}

struct FunctionEntry<N> {
    signature: FunctionSignature,
    body: FunctionImpl<N>,
}

pub struct FunctionLibrary<N> {
    entries: HashMap<ExpandedName, Vec<FunctionEntry<N>>>,
}

impl<N: XdmNode + 'static> Default for FunctionLibrary<N> {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl<N: XdmNode + 'static> FunctionLibrary<N> {
    /// Empty library.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Library with every built-in constructor and F&O function registered.
    pub fn with_builtins() -> Self {
        let mut lib = Self::new();
        register_default_functions(&mut lib);
        tracing::debug!(functions = lib.len(), "function library built");
        lib
    }

    /// Add a function; replaces an existing entry with the same name and arity.
    pub fn register<F>(&mut self, signature: FunctionSignature, body: F)
    where
        F: Fn(&CallCtx<'_>, &[XdmSequence<N>]) -> Result<XdmSequence<N>, Error>
            + Send
            + Sync
            + 'static,
    {
        let entries = self.entries.entry(signature.name.clone()).or_default();
        entries.retain(|e| e.signature.arity() != signature.arity());
        entries.push(FunctionEntry {
            signature,
            body: Arc::new(body),
        });
    }

    /// Number of (name, arity) pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn signature(&self, name: &ExpandedName, arity: usize) -> Option<&FunctionSignature> {
        self.entries
            .get(name)?
            .iter()
            .find(|e| e.signature.arity() == arity)
            .map(|e| &e.signature)
    }

    /// Sorted arities registered under `name`.
    pub fn arities(&self, name: &ExpandedName) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .entries
            .get(name)
            .map(|v| v.iter().map(|e| e.signature.arity()).collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    pub fn signatures(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.entries.values().flatten().map(|e| &e.signature)
    }

    fn resolve(
        &self,
        name: &ExpandedName,
        arity: usize,
        ctx: &StaticContext,
    ) -> Result<&FunctionEntry<N>, Error> {
        let defaulted;
        let name = match (&name.ns_uri, &ctx.default_function_namespace) {
            (None, Some(ns)) => {
                defaulted = ExpandedName::new(Some(ns.clone()), name.local.clone());
                &defaulted
            }
            _ => name,
        };
        self.entries
            .get(name)
            .and_then(|v| v.iter().find(|e| e.signature.arity() == arity))
            .ok_or_else(|| {
                tracing::debug!(function = %name, arity, "no matching function signature");
                Error::new(
                    ErrorCode::XPST0017,
                    ErrorKind::Arity,
                    format!("unknown function {name}#{arity}"),
                )
            })
    }

    /// Resolve, convert arguments and invoke a function.
    ///
    /// Unprefixed names are looked up in the context's default function namespace.
    pub fn evaluate(
        &self,
        name: &ExpandedName,
        args: &[XdmSequence<N>],
        ctx: &StaticContext,
    ) -> Result<XdmSequence<N>, Error> {
        let entry = self.resolve(name, args.len(), ctx)?;
        tracing::trace!(function = %entry.signature, "call");
        let converted = conversion::convert_arguments(&entry.signature, args, ctx)?;
        let call_ctx = CallCtx::new(ctx);
        (entry.body)(&call_ctx, &converted)
    }
}

fn register_default_functions<N: XdmNode + 'static>(lib: &mut FunctionLibrary<N>) {
    use Occurrence::*;

    macro_rules! reg_ns {
        ($ns:expr, $local:expr, [$($param:expr),* $(,)?], $func:expr $(,)?) => {{
            lib.register(
                FunctionSignature::new(
                    ExpandedName::new(Some($ns.to_string()), $local),
                    vec![$($param),*],
                ),
                $func,
            );
        }};
    }

    // ===== Constructors =====
    constructors::register(lib);

    // ===== Date/Time family =====
    reg_ns!(
        FNS,
        "dateTime",
        [ParamTypeSpec::date(ZeroOrOne), ParamTypeSpec::time(ZeroOrOne)],
        datetime::date_time_fn::<N>
    );
    reg_ns!(FNS, "current-dateTime", [], datetime::current_datetime_fn::<N>);
    reg_ns!(FNS, "current-date", [], datetime::current_date_fn::<N>);
    reg_ns!(FNS, "current-time", [], datetime::current_time_fn::<N>);
    reg_ns!(FNS, "implicit-timezone", [], datetime::implicit_timezone_fn::<N>);

    let dt = ParamTypeSpec::date_time(ZeroOrOne);
    reg_ns!(FNS, "year-from-dateTime", [dt], datetime::year_from_datetime_fn::<N>);
    reg_ns!(FNS, "month-from-dateTime", [dt], datetime::month_from_datetime_fn::<N>);
    reg_ns!(FNS, "day-from-dateTime", [dt], datetime::day_from_datetime_fn::<N>);
    reg_ns!(FNS, "hours-from-dateTime", [dt], datetime::hours_from_datetime_fn::<N>);
    reg_ns!(FNS, "minutes-from-dateTime", [dt], datetime::minutes_from_datetime_fn::<N>);
    reg_ns!(FNS, "seconds-from-dateTime", [dt], datetime::seconds_from_datetime_fn::<N>);
    reg_ns!(FNS, "timezone-from-dateTime", [dt], datetime::timezone_from_datetime_fn::<N>);

    let date = ParamTypeSpec::date(ZeroOrOne);
    reg_ns!(FNS, "year-from-date", [date], datetime::year_from_date_fn::<N>);
    reg_ns!(FNS, "month-from-date", [date], datetime::month_from_date_fn::<N>);
    reg_ns!(FNS, "day-from-date", [date], datetime::day_from_date_fn::<N>);
    reg_ns!(FNS, "timezone-from-date", [date], datetime::timezone_from_date_fn::<N>);

    let time = ParamTypeSpec::time(ZeroOrOne);
    reg_ns!(FNS, "hours-from-time", [time], datetime::hours_from_time_fn::<N>);
    reg_ns!(FNS, "minutes-from-time", [time], datetime::minutes_from_time_fn::<N>);
    reg_ns!(FNS, "seconds-from-time", [time], datetime::seconds_from_time_fn::<N>);
    reg_ns!(FNS, "timezone-from-time", [time], datetime::timezone_from_time_fn::<N>);

    let tz = ParamTypeSpec::day_time_duration(ZeroOrOne);
    reg_ns!(FNS, "adjust-dateTime-to-timezone", [dt], datetime::adjust_datetime_to_timezone_fn::<N>);
    reg_ns!(FNS, "adjust-dateTime-to-timezone", [dt, tz], datetime::adjust_datetime_to_timezone_fn::<N>);
    reg_ns!(FNS, "adjust-date-to-timezone", [date], datetime::adjust_date_to_timezone_fn::<N>);
    reg_ns!(FNS, "adjust-date-to-timezone", [date, tz], datetime::adjust_date_to_timezone_fn::<N>);
    reg_ns!(FNS, "adjust-time-to-timezone", [time], datetime::adjust_time_to_timezone_fn::<N>);
    reg_ns!(FNS, "adjust-time-to-timezone", [time, tz], datetime::adjust_time_to_timezone_fn::<N>);

    // ===== Durations =====
    let dur = ParamTypeSpec::duration(ZeroOrOne);
    reg_ns!(FNS, "years-from-duration", [dur], durations::years_from_duration_fn::<N>);
    reg_ns!(FNS, "months-from-duration", [dur], durations::months_from_duration_fn::<N>);
    reg_ns!(FNS, "days-from-duration", [dur], durations::days_from_duration_fn::<N>);
    reg_ns!(FNS, "hours-from-duration", [dur], durations::hours_from_duration_fn::<N>);
    reg_ns!(FNS, "minutes-from-duration", [dur], durations::minutes_from_duration_fn::<N>);
    reg_ns!(FNS, "seconds-from-duration", [dur], durations::seconds_from_duration_fn::<N>);

    // ===== Numeric =====
    let num = ParamTypeSpec::numeric(ZeroOrOne);
    reg_ns!(FNS, "abs", [num], numeric::abs_fn::<N>);
    reg_ns!(FNS, "ceiling", [num], numeric::ceiling_fn::<N>);
    reg_ns!(FNS, "floor", [num], numeric::floor_fn::<N>);
    reg_ns!(FNS, "round", [num], numeric::round_fn::<N>);
    reg_ns!(FNS, "round-half-to-even", [num], numeric::round_half_to_even_fn::<N>);
    reg_ns!(
        FNS,
        "round-half-to-even",
        [num, ParamTypeSpec::integer(ExactlyOne)],
        numeric::round_half_to_even_fn::<N>
    );

    // ===== QNames =====
    reg_ns!(
        FNS,
        "QName",
        [ParamTypeSpec::string(ZeroOrOne), ParamTypeSpec::string(ExactlyOne)],
        qnames::qname_fn::<N>
    );
    let qn = ParamTypeSpec::qname(ZeroOrOne);
    reg_ns!(FNS, "local-name-from-QName", [qn], qnames::local_name_from_qname_fn::<N>);
    reg_ns!(FNS, "prefix-from-QName", [qn], qnames::prefix_from_qname_fn::<N>);
    reg_ns!(FNS, "namespace-uri-from-QName", [qn], qnames::namespace_uri_from_qname_fn::<N>);

    // ===== Accessors =====
    reg_ns!(FNS, "string", [ParamTypeSpec::any_item(ZeroOrOne)], accessors::string_fn::<N>);
    reg_ns!(FNS, "data", [ParamTypeSpec::any_item(ZeroOrMore)], accessors::data_fn::<N>);
    reg_ns!(FNS, "boolean", [ParamTypeSpec::any_item(ZeroOrMore)], accessors::boolean_fn::<N>);
    reg_ns!(
        FNS,
        "compare",
        [ParamTypeSpec::string(ZeroOrOne), ParamTypeSpec::string(ZeroOrOne)],
        accessors::compare_fn::<N>
    );
}
