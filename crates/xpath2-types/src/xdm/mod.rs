use crate::consts::{FNS, XS};
use crate::engine::runtime::{Error, ErrorCode, NamespaceBindings};
use crate::temporal::duration::{DayTimeDuration, XsDuration, YearMonthDuration};
use crate::temporal::{GDay, GMonth, GMonthDay, GYear, GYearMonth, XsDate, XsDateTime, XsTime};
use core::fmt;
use rust_decimal::Decimal;

mod kind;
mod numeric;

pub use kind::{AtomicKind, IntegerKind};
pub use numeric::{XsInteger, format_decimal, format_double, format_float};
pub(crate) use numeric::{
    DecimalLexError, parse_decimal_lexical, parse_double_lexical, parse_float_lexical,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self {
            ns_uri,
            local: local.into(),
        }
    }

    /// Name in the XML Schema namespace.
    pub fn xs(local: impl Into<String>) -> Self {
        Self::new(Some(XS.to_string()), local)
    }

    /// Name in the F&O function namespace.
    pub fn fn_name(local: impl Into<String>) -> Self {
        Self::new(Some(FNS.to_string()), local)
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "Q{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// An atomic value tagged with its exact type.
///
/// Equality derived here is structural. XPath value comparison (`eq`, `lt`,
/// ...) lives in [`crate::engine::comparison`].
#[derive(Debug, Clone, PartialEq)]
pub enum XdmAtomicValue {
    UntypedAtomic(String),
    String(String),
    AnyUri(String),
    Boolean(bool),
    QName {
        ns_uri: Option<String>,
        prefix: Option<String>,
        local: String,
    },
    Decimal(Decimal),
    Integer(XsInteger),
    Float(f32),
    Double(f64),
    Duration(XsDuration),
    YearMonthDuration(YearMonthDuration),
    DayTimeDuration(DayTimeDuration),
    DateTime(XsDateTime),
    Date(XsDate),
    Time(XsTime),
    GYearMonth(GYearMonth),
    GYear(GYear),
    GMonthDay(GMonthDay),
    GDay(GDay),
    GMonth(GMonth),
}

impl XdmAtomicValue {
    /// Plain `xs:integer`.
    pub fn integer(value: i128) -> Self {
        XdmAtomicValue::Integer(XsInteger::integer(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        XdmAtomicValue::String(value.into())
    }

    pub fn kind(&self) -> AtomicKind {
        match self {
            XdmAtomicValue::UntypedAtomic(_) => AtomicKind::UntypedAtomic,
            XdmAtomicValue::String(_) => AtomicKind::String,
            XdmAtomicValue::AnyUri(_) => AtomicKind::AnyUri,
            XdmAtomicValue::Boolean(_) => AtomicKind::Boolean,
            XdmAtomicValue::QName { .. } => AtomicKind::QName,
            XdmAtomicValue::Decimal(_) => AtomicKind::Decimal,
            XdmAtomicValue::Integer(i) => AtomicKind::Integer(i.kind()),
            XdmAtomicValue::Float(_) => AtomicKind::Float,
            XdmAtomicValue::Double(_) => AtomicKind::Double,
            XdmAtomicValue::Duration(_) => AtomicKind::Duration,
            XdmAtomicValue::YearMonthDuration(_) => AtomicKind::YearMonthDuration,
            XdmAtomicValue::DayTimeDuration(_) => AtomicKind::DayTimeDuration,
            XdmAtomicValue::DateTime(_) => AtomicKind::DateTime,
            XdmAtomicValue::Date(_) => AtomicKind::Date,
            XdmAtomicValue::Time(_) => AtomicKind::Time,
            XdmAtomicValue::GYearMonth(_) => AtomicKind::GYearMonth,
            XdmAtomicValue::GYear(_) => AtomicKind::GYear,
            XdmAtomicValue::GMonthDay(_) => AtomicKind::GMonthDay,
            XdmAtomicValue::GDay(_) => AtomicKind::GDay,
            XdmAtomicValue::GMonth(_) => AtomicKind::GMonth,
        }
    }

    /// Type name as `xs:local`.
    pub fn type_name(&self) -> &'static str {
        self.kind().qname_str()
    }

    /// Canonical lexical representation.
    pub fn string_value(&self) -> String {
        match self {
            XdmAtomicValue::UntypedAtomic(s)
            | XdmAtomicValue::String(s)
            | XdmAtomicValue::AnyUri(s) => s.clone(),
            XdmAtomicValue::Boolean(b) => b.to_string(),
            XdmAtomicValue::QName { prefix, local, .. } => match prefix {
                Some(p) => format!("{p}:{local}"),
                None => local.clone(),
            },
            XdmAtomicValue::Decimal(d) => format_decimal(d),
            XdmAtomicValue::Integer(i) => i.to_string(),
            XdmAtomicValue::Float(v) => format_float(*v),
            XdmAtomicValue::Double(v) => format_double(*v),
            XdmAtomicValue::Duration(d) => d.to_string(),
            XdmAtomicValue::YearMonthDuration(d) => d.to_string(),
            XdmAtomicValue::DayTimeDuration(d) => d.to_string(),
            XdmAtomicValue::DateTime(v) => v.to_string(),
            XdmAtomicValue::Date(v) => v.to_string(),
            XdmAtomicValue::Time(v) => v.to_string(),
            XdmAtomicValue::GYearMonth(v) => v.to_string(),
            XdmAtomicValue::GYear(v) => v.to_string(),
            XdmAtomicValue::GMonthDay(v) => v.to_string(),
            XdmAtomicValue::GDay(v) => v.to_string(),
            XdmAtomicValue::GMonth(v) => v.to_string(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            XdmAtomicValue::Integer(i) => Some(i.value()),
            _ => None,
        }
    }

    /// View any member of the duration family as a general `xs:duration`.
    pub fn as_duration(&self) -> Option<XsDuration> {
        match self {
            XdmAtomicValue::Duration(d) => Some(*d),
            XdmAtomicValue::YearMonthDuration(d) => Some(XsDuration::from(*d)),
            XdmAtomicValue::DayTimeDuration(d) => Some(XsDuration::from(*d)),
            _ => None,
        }
    }

    /// Parse `lexical` as `kind`, returning `None` on any lexical or facet failure.
    pub fn parse(kind: AtomicKind, lexical: &str) -> Option<Self> {
        Self::from_lexical(kind, lexical).ok()
    }

    /// Parse `lexical` as `kind` with only the reserved namespace prefixes in scope.
    pub fn from_lexical(kind: AtomicKind, lexical: &str) -> Result<Self, Error> {
        Self::from_lexical_in(kind, lexical, None)
    }

    /// Parse `lexical` as `kind`.
    ///
    /// Whitespace is collapsed for every target except `xs:string` and
    /// `xs:untypedAtomic`. QName prefixes resolve against `namespaces` and
    /// then the reserved prefixes.
    pub fn from_lexical_in(
        kind: AtomicKind,
        lexical: &str,
        namespaces: Option<&NamespaceBindings>,
    ) -> Result<Self, Error> {
        let invalid = || Error::lexical(kind, lexical);
        let text = collapse_whitespace(lexical);
        let s = text.as_str();
        let value = match kind {
            AtomicKind::String => XdmAtomicValue::String(lexical.to_string()),
            AtomicKind::UntypedAtomic => XdmAtomicValue::UntypedAtomic(lexical.to_string()),
            AtomicKind::AnyUri => XdmAtomicValue::AnyUri(text.clone()),
            AtomicKind::Boolean => match s {
                "true" | "1" => XdmAtomicValue::Boolean(true),
                "false" | "0" => XdmAtomicValue::Boolean(false),
                _ => return Err(invalid()),
            },
            AtomicKind::QName => resolve_qname_lexical(s, namespaces)?,
            AtomicKind::Decimal => match parse_decimal_lexical(s) {
                Ok(d) => XdmAtomicValue::Decimal(d),
                Err(DecimalLexError::Syntax) => return Err(invalid()),
                Err(DecimalLexError::Overflow) => {
                    return Err(Error::from_code(
                        ErrorCode::FOCA0001,
                        format!("decimal value out of range: {s}"),
                    ));
                }
            },
            AtomicKind::Integer(k) => XdmAtomicValue::Integer(XsInteger::parse(k, s)?),
            AtomicKind::Float => XdmAtomicValue::Float(parse_float_lexical(s).ok_or_else(invalid)?),
            AtomicKind::Double => {
                XdmAtomicValue::Double(parse_double_lexical(s).ok_or_else(invalid)?)
            }
            AtomicKind::Duration => XdmAtomicValue::Duration(XsDuration::parse(s).ok_or_else(invalid)?),
            AtomicKind::YearMonthDuration => {
                XdmAtomicValue::YearMonthDuration(YearMonthDuration::parse(s).ok_or_else(invalid)?)
            }
            AtomicKind::DayTimeDuration => {
                XdmAtomicValue::DayTimeDuration(DayTimeDuration::parse(s).ok_or_else(invalid)?)
            }
            AtomicKind::DateTime => XdmAtomicValue::DateTime(XsDateTime::parse(s).ok_or_else(invalid)?),
            AtomicKind::Date => XdmAtomicValue::Date(XsDate::parse(s).ok_or_else(invalid)?),
            AtomicKind::Time => XdmAtomicValue::Time(XsTime::parse(s).ok_or_else(invalid)?),
            AtomicKind::GYearMonth => {
                XdmAtomicValue::GYearMonth(GYearMonth::parse(s).ok_or_else(invalid)?)
            }
            AtomicKind::GYear => XdmAtomicValue::GYear(GYear::parse(s).ok_or_else(invalid)?),
            AtomicKind::GMonthDay => XdmAtomicValue::GMonthDay(GMonthDay::parse(s).ok_or_else(invalid)?),
            AtomicKind::GDay => XdmAtomicValue::GDay(GDay::parse(s).ok_or_else(invalid)?),
            AtomicKind::GMonth => XdmAtomicValue::GMonth(GMonth::parse(s).ok_or_else(invalid)?),
        };
        Ok(value)
    }
}

impl fmt::Display for XdmAtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value())
    }
}

/// XML whitespace collapse: trim and squash internal runs to one space.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split([' ', '\t', '\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{B7}'))
}

/// Split `prefix:local` / `local`; `None` when either part is not an NCName.
pub(crate) fn split_qname_lexical(s: &str) -> Option<(Option<&str>, &str)> {
    match s.split_once(':') {
        Some((p, l)) if is_ncname(p) && is_ncname(l) => Some((Some(p), l)),
        Some(_) => None,
        None if is_ncname(s) => Some((None, s)),
        None => None,
    }
}

fn resolve_qname_lexical(
    s: &str,
    namespaces: Option<&NamespaceBindings>,
) -> Result<XdmAtomicValue, Error> {
    let (prefix, local) =
        split_qname_lexical(s).ok_or_else(|| Error::lexical(AtomicKind::QName, s))?;
    let ns_uri = match prefix {
        Some(p) => Some(
            NamespaceBindings::resolve(namespaces, p)
                .ok_or_else(|| {
                    Error::from_code(ErrorCode::FONS0004, format!("no namespace bound to prefix '{p}'"))
                })?
                .to_string(),
        ),
        None => None,
    };
    Ok(XdmAtomicValue::QName {
        ns_uri,
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum XdmItem<N> {
    Node(N),
    Atomic(XdmAtomicValue),
}

pub type XdmSequence<N> = Vec<XdmItem<N>>;

impl<N> From<XdmAtomicValue> for XdmItem<N> {
    fn from(value: XdmAtomicValue) -> Self {
        XdmItem::Atomic(value)
    }
}

impl<N: fmt::Debug> fmt::Display for XdmItem<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XdmItem::Atomic(a) => write!(f, "{a}"),
            XdmItem::Node(n) => write!(f, "{n:?}"),
        }
    }
}
