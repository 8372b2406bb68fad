use super::ExpandedName;
use crate::consts::XS;

/// The thirteen built-in integer types, each a bounded restriction of `xs:integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    Integer,
    NonPositiveInteger,
    NegativeInteger,
    Long,
    Int,
    Short,
    Byte,
    NonNegativeInteger,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    PositiveInteger,
}

impl IntegerKind {
    pub const ALL: [IntegerKind; 13] = [
        IntegerKind::Integer,
        IntegerKind::NonPositiveInteger,
        IntegerKind::NegativeInteger,
        IntegerKind::Long,
        IntegerKind::Int,
        IntegerKind::Short,
        IntegerKind::Byte,
        IntegerKind::NonNegativeInteger,
        IntegerKind::UnsignedLong,
        IntegerKind::UnsignedInt,
        IntegerKind::UnsignedShort,
        IntegerKind::UnsignedByte,
        IntegerKind::PositiveInteger,
    ];

    pub fn local_name(self) -> &'static str {
        match self {
            IntegerKind::Integer => "integer",
            IntegerKind::NonPositiveInteger => "nonPositiveInteger",
            IntegerKind::NegativeInteger => "negativeInteger",
            IntegerKind::Long => "long",
            IntegerKind::Int => "int",
            IntegerKind::Short => "short",
            IntegerKind::Byte => "byte",
            IntegerKind::NonNegativeInteger => "nonNegativeInteger",
            IntegerKind::UnsignedLong => "unsignedLong",
            IntegerKind::UnsignedInt => "unsignedInt",
            IntegerKind::UnsignedShort => "unsignedShort",
            IntegerKind::UnsignedByte => "unsignedByte",
            IntegerKind::PositiveInteger => "positiveInteger",
        }
    }

    fn qname_str(self) -> &'static str {
        match self {
            IntegerKind::Integer => "xs:integer",
            IntegerKind::NonPositiveInteger => "xs:nonPositiveInteger",
            IntegerKind::NegativeInteger => "xs:negativeInteger",
            IntegerKind::Long => "xs:long",
            IntegerKind::Int => "xs:int",
            IntegerKind::Short => "xs:short",
            IntegerKind::Byte => "xs:byte",
            IntegerKind::NonNegativeInteger => "xs:nonNegativeInteger",
            IntegerKind::UnsignedLong => "xs:unsignedLong",
            IntegerKind::UnsignedInt => "xs:unsignedInt",
            IntegerKind::UnsignedShort => "xs:unsignedShort",
            IntegerKind::UnsignedByte => "xs:unsignedByte",
            IntegerKind::PositiveInteger => "xs:positiveInteger",
        }
    }

    /// Inclusive `(min, max)` facet; `None` means unbounded on that side.
    pub fn bounds(self) -> (Option<i128>, Option<i128>) {
        match self {
            IntegerKind::Integer => (None, None),
            IntegerKind::NonPositiveInteger => (None, Some(0)),
            IntegerKind::NegativeInteger => (None, Some(-1)),
            IntegerKind::Long => (Some(i64::MIN as i128), Some(i64::MAX as i128)),
            IntegerKind::Int => (Some(i32::MIN as i128), Some(i32::MAX as i128)),
            IntegerKind::Short => (Some(i16::MIN as i128), Some(i16::MAX as i128)),
            IntegerKind::Byte => (Some(i8::MIN as i128), Some(i8::MAX as i128)),
            IntegerKind::NonNegativeInteger => (Some(0), None),
            IntegerKind::UnsignedLong => (Some(0), Some(u64::MAX as i128)),
            IntegerKind::UnsignedInt => (Some(0), Some(u32::MAX as i128)),
            IntegerKind::UnsignedShort => (Some(0), Some(u16::MAX as i128)),
            IntegerKind::UnsignedByte => (Some(0), Some(u8::MAX as i128)),
            IntegerKind::PositiveInteger => (Some(1), None),
        }
    }

    pub fn admits(self, value: i128) -> bool {
        let (min, max) = self.bounds();
        min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
    }

    /// Immediate base type in the schema hierarchy.
    pub fn parent(self) -> Option<IntegerKind> {
        match self {
            IntegerKind::Integer => None,
            IntegerKind::NonPositiveInteger => Some(IntegerKind::Integer),
            IntegerKind::NegativeInteger => Some(IntegerKind::NonPositiveInteger),
            IntegerKind::Long => Some(IntegerKind::Integer),
            IntegerKind::Int => Some(IntegerKind::Long),
            IntegerKind::Short => Some(IntegerKind::Int),
            IntegerKind::Byte => Some(IntegerKind::Short),
            IntegerKind::NonNegativeInteger => Some(IntegerKind::Integer),
            IntegerKind::UnsignedLong => Some(IntegerKind::NonNegativeInteger),
            IntegerKind::UnsignedInt => Some(IntegerKind::UnsignedLong),
            IntegerKind::UnsignedShort => Some(IntegerKind::UnsignedInt),
            IntegerKind::UnsignedByte => Some(IntegerKind::UnsignedShort),
            IntegerKind::PositiveInteger => Some(IntegerKind::NonNegativeInteger),
        }
    }

    /// True when `self` equals `base` or is derived from it by restriction.
    pub fn derives_from(self, base: IntegerKind) -> bool {
        let mut cur = Some(self);
        while let Some(k) = cur {
            if k == base {
                return true;
            }
            cur = k.parent();
        }
        false
    }
}

/// Closed tag of every atomic type this crate models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicKind {
    UntypedAtomic,
    String,
    AnyUri,
    Boolean,
    QName,
    Decimal,
    Integer(IntegerKind),
    Float,
    Double,
    Duration,
    YearMonthDuration,
    DayTimeDuration,
    DateTime,
    Date,
    Time,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
}

const NON_INTEGER_KINDS: [AtomicKind; 19] = [
    AtomicKind::UntypedAtomic,
    AtomicKind::String,
    AtomicKind::AnyUri,
    AtomicKind::Boolean,
    AtomicKind::QName,
    AtomicKind::Decimal,
    AtomicKind::Float,
    AtomicKind::Double,
    AtomicKind::Duration,
    AtomicKind::YearMonthDuration,
    AtomicKind::DayTimeDuration,
    AtomicKind::DateTime,
    AtomicKind::Date,
    AtomicKind::Time,
    AtomicKind::GYearMonth,
    AtomicKind::GYear,
    AtomicKind::GMonthDay,
    AtomicKind::GDay,
    AtomicKind::GMonth,
];

impl AtomicKind {
    /// Every kind, integer subtypes included.
    pub fn all() -> impl Iterator<Item = AtomicKind> {
        NON_INTEGER_KINDS
            .into_iter()
            .chain(IntegerKind::ALL.into_iter().map(AtomicKind::Integer))
    }

    pub fn local_name(self) -> &'static str {
        match self {
            AtomicKind::UntypedAtomic => "untypedAtomic",
            AtomicKind::String => "string",
            AtomicKind::AnyUri => "anyURI",
            AtomicKind::Boolean => "boolean",
            AtomicKind::QName => "QName",
            AtomicKind::Decimal => "decimal",
            AtomicKind::Integer(k) => k.local_name(),
            AtomicKind::Float => "float",
            AtomicKind::Double => "double",
            AtomicKind::Duration => "duration",
            AtomicKind::YearMonthDuration => "yearMonthDuration",
            AtomicKind::DayTimeDuration => "dayTimeDuration",
            AtomicKind::DateTime => "dateTime",
            AtomicKind::Date => "date",
            AtomicKind::Time => "time",
            AtomicKind::GYearMonth => "gYearMonth",
            AtomicKind::GYear => "gYear",
            AtomicKind::GMonthDay => "gMonthDay",
            AtomicKind::GDay => "gDay",
            AtomicKind::GMonth => "gMonth",
        }
    }

    /// Prefixed type name as reported in messages (`xs:date`).
    pub fn qname_str(self) -> &'static str {
        match self {
            AtomicKind::UntypedAtomic => "xs:untypedAtomic",
            AtomicKind::String => "xs:string",
            AtomicKind::AnyUri => "xs:anyURI",
            AtomicKind::Boolean => "xs:boolean",
            AtomicKind::QName => "xs:QName",
            AtomicKind::Decimal => "xs:decimal",
            AtomicKind::Integer(k) => k.qname_str(),
            AtomicKind::Float => "xs:float",
            AtomicKind::Double => "xs:double",
            AtomicKind::Duration => "xs:duration",
            AtomicKind::YearMonthDuration => "xs:yearMonthDuration",
            AtomicKind::DayTimeDuration => "xs:dayTimeDuration",
            AtomicKind::DateTime => "xs:dateTime",
            AtomicKind::Date => "xs:date",
            AtomicKind::Time => "xs:time",
            AtomicKind::GYearMonth => "xs:gYearMonth",
            AtomicKind::GYear => "xs:gYear",
            AtomicKind::GMonthDay => "xs:gMonthDay",
            AtomicKind::GDay => "xs:gDay",
            AtomicKind::GMonth => "xs:gMonth",
        }
    }

    pub fn from_local_name(local: &str) -> Option<AtomicKind> {
        AtomicKind::all().find(|k| k.local_name() == local)
    }

    /// Resolve an expanded type name; only names in the XML Schema namespace match.
    pub fn from_expanded(name: &ExpandedName) -> Option<AtomicKind> {
        if name.ns_uri.as_deref() != Some(XS) {
            return None;
        }
        AtomicKind::from_local_name(&name.local)
    }

    pub fn expanded_name(self) -> ExpandedName {
        ExpandedName::xs(self.local_name())
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            AtomicKind::Decimal | AtomicKind::Integer(_) | AtomicKind::Float | AtomicKind::Double
        )
    }

    pub fn is_duration(self) -> bool {
        matches!(
            self,
            AtomicKind::Duration | AtomicKind::YearMonthDuration | AtomicKind::DayTimeDuration
        )
    }

    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            AtomicKind::String | AtomicKind::AnyUri | AtomicKind::UntypedAtomic
        )
    }

    /// Subtype substitution: `self` may stand wherever `base` is expected.
    pub fn derives_from(self, base: AtomicKind) -> bool {
        match (self, base) {
            (a, b) if a == b => true,
            (AtomicKind::Integer(a), AtomicKind::Integer(b)) => a.derives_from(b),
            (AtomicKind::Integer(_), AtomicKind::Decimal) => true,
            (AtomicKind::YearMonthDuration | AtomicKind::DayTimeDuration, AtomicKind::Duration) => {
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_hierarchy() {
        assert!(IntegerKind::Byte.derives_from(IntegerKind::Long));
        assert!(IntegerKind::PositiveInteger.derives_from(IntegerKind::NonNegativeInteger));
        assert!(!IntegerKind::PositiveInteger.derives_from(IntegerKind::UnsignedLong));
        assert!(!IntegerKind::Integer.derives_from(IntegerKind::Int));
    }

    #[test]
    fn facets() {
        assert!(!IntegerKind::PositiveInteger.admits(0));
        assert!(IntegerKind::NonPositiveInteger.admits(0));
        assert!(IntegerKind::UnsignedByte.admits(255));
        assert!(!IntegerKind::Byte.admits(128));
    }

    #[test]
    fn names_are_unique() {
        let names: std::collections::HashSet<_> = AtomicKind::all().map(|k| k.local_name()).collect();
        assert_eq!(names.len(), AtomicKind::all().count());
        assert_eq!(AtomicKind::from_local_name("anyURI"), Some(AtomicKind::AnyUri));
        assert_eq!(
            AtomicKind::from_local_name("unsignedShort"),
            Some(AtomicKind::Integer(IntegerKind::UnsignedShort))
        );
    }
}
