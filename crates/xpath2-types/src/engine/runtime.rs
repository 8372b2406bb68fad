use crate::consts::{ERR_NS, FNS, reserved_namespace};
use crate::temporal::offset_from_minutes;
use crate::xdm::{AtomicKind, ExpandedName};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

/// W3C error codes raised by the value layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum ErrorCode {
    /// Division by zero.
    FOAR0001,
    /// Numeric operation overflow/underflow.
    FOAR0002,
    /// Input value too large for decimal.
    FOCA0001,
    /// Invalid lexical value.
    FOCA0002,
    /// Input value too large for integer.
    FOCA0003,
    /// NaN supplied as float/double value.
    FOCA0005,
    /// Overflow/underflow in date/time operation.
    FODT0001,
    /// Overflow/underflow in duration operation.
    FODT0002,
    /// Invalid timezone value.
    FODT0003,
    /// No namespace found for prefix.
    FONS0004,
    /// Invalid value for cast/constructor.
    FORG0001,
    /// Invalid argument type.
    FORG0006,
    /// Both arguments to fn:dateTime have a specified timezone.
    FORG0008,
    XPTY0004,
    XPST0017,
    XPST0051,
    XPST0080,
    Unknown,
}

impl ErrorCode {
    pub fn local(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            FOAR0001 => "FOAR0001",
            FOAR0002 => "FOAR0002",
            FOCA0001 => "FOCA0001",
            FOCA0002 => "FOCA0002",
            FOCA0003 => "FOCA0003",
            FOCA0005 => "FOCA0005",
            FODT0001 => "FODT0001",
            FODT0002 => "FODT0002",
            FODT0003 => "FODT0003",
            FONS0004 => "FONS0004",
            FORG0001 => "FORG0001",
            FORG0006 => "FORG0006",
            FORG0008 => "FORG0008",
            XPTY0004 => "XPTY0004",
            XPST0017 => "XPST0017",
            XPST0051 => "XPST0051",
            XPST0080 => "XPST0080",
            Unknown => "UNKNOWN",
        }
    }

    pub fn qname(&self) -> ExpandedName {
        ExpandedName::new(Some(ERR_NS.to_string()), self.local())
    }

    /// Parse `err:LOCAL`; anything unrecognised maps to `Unknown`.
    pub fn from_code(s: &str) -> Self {
        use ErrorCode::*;
        let Some(local) = s.strip_prefix("err:") else {
            return Unknown;
        };
        [
            FOAR0001, FOAR0002, FOCA0001, FOCA0002, FOCA0003, FOCA0005, FODT0001, FODT0002,
            FODT0003, FONS0004, FORG0001, FORG0006, FORG0008, XPTY0004, XPST0017, XPST0051,
            XPST0080,
        ]
        .into_iter()
        .find(|c| c.local() == local)
        .unwrap_or(Unknown)
    }

    /// Category assumed when an error is raised from a bare code.
    fn default_kind(self) -> ErrorKind {
        use ErrorCode::*;
        match self {
            FORG0001 | FOCA0002 => ErrorKind::Lexical,
            FORG0008 => ErrorKind::TimezoneConflict,
            FOAR0001 | FOAR0002 | FOCA0001 | FOCA0003 | FOCA0005 | FODT0001 | FODT0002 => {
                ErrorKind::Arithmetic
            }
            XPTY0004 => ErrorKind::Type,
            XPST0017 => ErrorKind::Arity,
            _ => ErrorKind::Dynamic,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "err:{}", self.local())
    }
}

/// Finer classification than the W3C code alone gives, so callers can tell
/// a lexical failure from a facet violation even though both are `FORG0001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lexical,
    Facet,
    IllegalCast,
    TimezoneConflict,
    Cardinality,
    Arity,
    Type,
    Arithmetic,
    Dynamic,
}

#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>, // optional chained cause
}

impl Error {
    pub fn new(code: ErrorCode, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            code,
            kind,
            message: msg.into(),
            source: None,
        }
    }

    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new(code, code.default_kind(), msg)
    }

    pub fn code_enum(&self) -> ErrorCode {
        self.code
    }

    pub fn code_qname(&self) -> ExpandedName {
        self.code.qname()
    }

    pub fn format_code(&self) -> String {
        self.code.to_string()
    }

    /// Compose an error with a source cause.
    pub fn with_source(
        mut self,
        source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>,
    ) -> Self {
        self.source = source.into();
        self
    }

    pub(crate) fn lexical(target: AtomicKind, text: &str) -> Self {
        Self::new(
            ErrorCode::FORG0001,
            ErrorKind::Lexical,
            format!("invalid lexical form for {}: '{}'", target.qname_str(), text),
        )
    }

    pub(crate) fn facet(target: AtomicKind, value: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::FORG0001,
            ErrorKind::Facet,
            format!("value {} out of range for {}", value, target.qname_str()),
        )
    }

    pub(crate) fn illegal_cast(source: AtomicKind, target: AtomicKind) -> Self {
        Self::new(
            ErrorCode::XPTY0004,
            ErrorKind::IllegalCast,
            format!("cannot cast {} to {}", source.qname_str(), target.qname_str()),
        )
    }

    pub(crate) fn type_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::XPTY0004, ErrorKind::Type, msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} ({})", self.message, self.format_code())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceBindings {
    pub by_prefix: HashMap<String, String>,
}

impl NamespaceBindings {
    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        self.by_prefix.get(prefix).map(String::as_str)
    }

    /// Look up `prefix` in `bindings`, falling back to the reserved prefixes.
    pub fn resolve<'a>(bindings: Option<&'a NamespaceBindings>, prefix: &str) -> Option<&'a str> {
        if let Some(b) = bindings
            && let Some(uri) = b.lookup(prefix)
        {
            return Some(uri);
        }
        reserved_namespace(prefix)
    }
}

/// Static context: the environment shared by every operation of one evaluation.
#[derive(Debug, Clone)]
pub struct StaticContext {
    pub implicit_timezone: FixedOffset,
    /// Snapshot returned by `fn:current-dateTime` and friends; stable for the
    /// lifetime of the context.
    pub current_date_time: DateTime<FixedOffset>,
    pub default_function_namespace: Option<String>,
    pub namespaces: NamespaceBindings,
}

impl Default for StaticContext {
    fn default() -> Self {
        StaticContextBuilder::new().build()
    }
}

impl StaticContext {
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        NamespaceBindings::resolve(Some(&self.namespaces), prefix)
    }
}

/// Builder for `StaticContext`: explicit namespace registrations and
/// defaults, with the reserved prefixes always bound.
pub struct StaticContextBuilder {
    implicit_timezone: FixedOffset,
    current_date_time: Option<DateTime<FixedOffset>>,
    default_function_namespace: Option<String>,
    namespaces: NamespaceBindings,
}

impl Default for StaticContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticContextBuilder {
    pub fn new() -> Self {
        let mut namespaces = NamespaceBindings::default();
        for prefix in ["xml", "xs", "fn", "err"] {
            if let Some(uri) = reserved_namespace(prefix) {
                namespaces.by_prefix.insert(prefix.to_string(), uri.to_string());
            }
        }
        Self {
            implicit_timezone: Utc.fix(),
            current_date_time: None,
            default_function_namespace: Some(FNS.to_string()),
            namespaces,
        }
    }

    /// Offsets that are not whole minutes within ±14:00 are ignored.
    pub fn with_implicit_timezone(self, tz: FixedOffset) -> Self {
        let seconds = tz.local_minus_utc();
        if seconds % 60 != 0 {
            return self;
        }
        self.with_implicit_timezone_minutes(seconds / 60)
    }

    /// Offset in minutes east of UTC. Values outside ±14:00 are ignored.
    pub fn with_implicit_timezone_minutes(mut self, minutes: i32) -> Self {
        if let Some(tz) = offset_from_minutes(minutes) {
            self.implicit_timezone = tz;
        }
        self
    }

    pub fn with_current_date_time(mut self, now: DateTime<FixedOffset>) -> Self {
        self.current_date_time = Some(now);
        self
    }

    pub fn with_default_function_namespace(mut self, uri: impl Into<String>) -> Self {
        self.default_function_namespace = Some(uri.into());
        self
    }

    /// Register a namespace prefix → URI mapping. Attempts to rebind the
    /// reserved `xml` prefix are ignored.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let p = prefix.into();
        if p == "xml" {
            return self;
        }
        self.namespaces.by_prefix.insert(p, uri.into());
        self
    }

    pub fn build(self) -> StaticContext {
        let implicit_timezone = self.implicit_timezone;
        let current_date_time = self
            .current_date_time
            .unwrap_or_else(|| Utc::now().with_timezone(&implicit_timezone));
        StaticContext {
            implicit_timezone,
            current_date_time,
            default_function_namespace: self.default_function_namespace,
            namespaces: self.namespaces,
        }
    }
}

/// Per-call view handed to function implementations.
pub struct CallCtx<'a> {
    pub static_ctx: &'a StaticContext,
}

impl<'a> CallCtx<'a> {
    pub fn new(static_ctx: &'a StaticContext) -> Self {
        Self { static_ctx }
    }

    pub fn implicit_timezone(&self) -> FixedOffset {
        self.static_ctx.implicit_timezone
    }
}
