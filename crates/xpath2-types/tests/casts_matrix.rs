use rstest::rstest;
use std::collections::HashMap;
use xpath2_types::{
    AtomicKind as K, CastRule, ErrorCode, ErrorKind, ExpandedName, IntegerKind, NamespaceBindings, Temporal,
    XdmAtomicValue as A, cast, cast_rule, cast_to_name, cast_with, is_castable,
};

fn v(kind: K, text: &str) -> A {
    A::from_lexical(kind, text).unwrap()
}

fn expect_err(value: A, target: K, code: ErrorCode) -> ErrorKind {
    match cast(&value, target) {
        Ok(out) => panic!("expected {code}, got {out:?}"),
        Err(e) => {
            assert_eq!(e.code_enum(), code, "{e}");
            e.kind
        }
    }
}

// === Castability table ===

#[rstest]
#[case(K::Time, K::GMonthDay, false)]
#[case(K::Time, K::GYear, false)]
#[case(K::Date, K::GMonthDay, true)]
#[case(K::DateTime, K::GMonthDay, true)]
#[case(K::String, K::GMonthDay, true)]
#[case(K::UntypedAtomic, K::GMonthDay, true)]
#[case(K::GMonthDay, K::GMonthDay, true)]
#[case(K::Integer(IntegerKind::Integer), K::GMonthDay, false)]
#[case(K::Boolean, K::Date, false)]
#[case(K::GYear, K::GYearMonth, false)]
#[case(K::Date, K::Time, false)]
#[case(K::DateTime, K::Time, true)]
#[case(K::Duration, K::DayTimeDuration, true)]
#[case(K::YearMonthDuration, K::DayTimeDuration, true)]
#[case(K::Duration, K::Double, false)]
#[case(K::Boolean, K::Double, true)]
#[case(K::AnyUri, K::String, true)]
#[case(K::String, K::AnyUri, true)]
#[case(K::AnyUri, K::QName, false)]
#[case(K::UntypedAtomic, K::QName, false)]
#[case(K::String, K::QName, true)]
#[case(K::QName, K::String, true)]
#[case(K::Double, K::Integer(IntegerKind::UnsignedByte), true)]
fn castability(#[case] from: K, #[case] to: K, #[case] expected: bool) {
    assert_eq!(is_castable(from, to), expected, "{} -> {}", from.qname_str(), to.qname_str());
}

#[test]
fn rule_categories() {
    assert_eq!(cast_rule(K::Date, K::GMonthDay), CastRule::Project);
    assert_eq!(cast_rule(K::Double, K::Decimal), CastRule::Numeric);
    assert_eq!(cast_rule(K::Duration, K::YearMonthDuration), CastRule::Duration);
    assert_eq!(cast_rule(K::Double, K::String), CastRule::ToString);
    assert_eq!(cast_rule(K::String, K::Date), CastRule::Parse);
    assert_eq!(cast_rule(K::Time, K::GMonthDay), CastRule::Forbidden);
}

// === Temporal projections ===

#[test]
fn time_to_gmonthday_is_illegal() {
    let kind = expect_err(v(K::Time, "12:00:00"), K::GMonthDay, ErrorCode::XPTY0004);
    assert_eq!(kind, ErrorKind::IllegalCast);
}

#[rstest]
#[case(K::Date, "2004-12-25+05:00", "--12-25+05:00", true)]
#[case(K::Date, "2004-12-25", "--12-25", false)]
#[case(K::DateTime, "2004-02-29T10:00:00Z", "--02-29Z", true)]
#[case(K::String, " --05-12 ", "--05-12", false)]
#[case(K::UntypedAtomic, "--05-12-03:00", "--05-12-03:00", true)]
fn to_gmonthday(#[case] from: K, #[case] text: &str, #[case] expected: &str, #[case] timezoned: bool) {
    match cast(&v(from, text), K::GMonthDay).unwrap() {
        A::GMonthDay(md) => {
            assert_eq!(md.to_string(), expected);
            assert_eq!(md.is_timezoned(), timezoned);
        }
        other => panic!("expected gMonthDay, got {other:?}"),
    }
}

#[rstest]
#[case(K::Date, "2004-12-25+05:00", K::DateTime, "2004-12-25T00:00:00+05:00")]
#[case(K::DateTime, "2004-12-25T10:30:15.25Z", K::Time, "10:30:15.25Z")]
#[case(K::DateTime, "2004-12-25T10:30:00-01:00", K::Date, "2004-12-25-01:00")]
#[case(K::Date, "1999-05-31", K::GYearMonth, "1999-05")]
#[case(K::Date, "1999-05-31Z", K::GYear, "1999Z")]
#[case(K::DateTime, "1999-05-31T00:00:00", K::GDay, "---31")]
#[case(K::Date, "1999-05-31", K::GMonth, "--05")]
fn temporal_projection(#[case] from: K, #[case] text: &str, #[case] to: K, #[case] expected: &str) {
    let out = cast(&v(from, text), to).unwrap();
    assert_eq!(out.kind(), to);
    assert_eq!(out.string_value(), expected);
}

// === Numeric tower and cross casts ===

#[rstest]
#[case(A::Double(2.9), K::Integer(IntegerKind::Integer), "2")]
#[case(A::Double(-2.9), K::Integer(IntegerKind::Integer), "-2")]
#[case(A::Float(7.0), K::Integer(IntegerKind::Integer), "7")]
#[case(A::Decimal("3.7".parse().unwrap()), K::Integer(IntegerKind::Integer), "3")]
#[case(A::Boolean(true), K::Double, "1")]
#[case(A::Boolean(false), K::Decimal, "0")]
#[case(A::integer(0), K::Boolean, "false")]
#[case(A::Double(f64::NAN), K::Boolean, "false")]
#[case(A::integer(1_000_000), K::Double, "1.0E6")]
#[case(A::Double(0.5), K::Decimal, "0.5")]
#[case(A::Double(1.5e-7), K::String, "1.5E-7")]
#[case(A::Float(0.1), K::String, "0.1")]
#[case(A::integer(200), K::Integer(IntegerKind::UnsignedByte), "200")]
fn numeric_casts(#[case] value: A, #[case] target: K, #[case] expected: &str) {
    let out = cast(&value, target).unwrap();
    assert_eq!(out.kind(), target);
    assert_eq!(out.string_value(), expected);
}

#[rstest]
#[case(A::Double(f64::NAN), K::Integer(IntegerKind::Integer), ErrorCode::FOCA0002)]
#[case(A::Double(f64::INFINITY), K::Decimal, ErrorCode::FOCA0002)]
#[case(A::Float(f32::NEG_INFINITY), K::Integer(IntegerKind::Long), ErrorCode::FOCA0002)]
#[case(A::Double(1e40), K::Integer(IntegerKind::Integer), ErrorCode::FOCA0003)]
#[case(A::Double(1e40), K::Decimal, ErrorCode::FOCA0001)]
#[case(A::integer(300), K::Integer(IntegerKind::Byte), ErrorCode::FORG0001)]
#[case(A::string("abc"), K::Integer(IntegerKind::Integer), ErrorCode::FORG0001)]
#[case(A::string("2001-02-30"), K::Date, ErrorCode::FORG0001)]
#[case(A::UntypedAtomic("xs:string".into()), K::QName, ErrorCode::XPTY0004)]
#[case(A::integer(1), K::Date, ErrorCode::XPTY0004)]
fn cast_errors(#[case] value: A, #[case] target: K, #[case] code: ErrorCode) {
    expect_err(value, target, code);
}

#[test]
fn string_to_byte_is_facet_error() {
    let kind = expect_err(A::string("300"), K::Integer(IntegerKind::Byte), ErrorCode::FORG0001);
    assert_eq!(kind, ErrorKind::Facet);
}

// === Durations ===

#[rstest]
#[case(K::Duration, "P1Y2DT3H", K::YearMonthDuration, "P1Y")]
#[case(K::Duration, "P1Y2DT3H", K::DayTimeDuration, "P2DT3H")]
#[case(K::YearMonthDuration, "P1Y", K::DayTimeDuration, "PT0S")]
#[case(K::DayTimeDuration, "-PT90M", K::Duration, "-PT1H30M")]
#[case(K::String, "P13M", K::YearMonthDuration, "P1Y1M")]
fn duration_casts(#[case] from: K, #[case] text: &str, #[case] to: K, #[case] expected: &str) {
    assert_eq!(cast(&v(from, text), to).unwrap().string_value(), expected);
}

// === QNames ===

#[test]
fn qname_from_string_uses_bindings() {
    let bindings = NamespaceBindings {
        by_prefix: HashMap::from([("ex".to_string(), "urn:example".to_string())]),
    };
    match cast_with(&A::string("ex:item"), K::QName, Some(&bindings)).unwrap() {
        A::QName { ns_uri, prefix, local } => {
            assert_eq!(ns_uri.as_deref(), Some("urn:example"));
            assert_eq!(prefix.as_deref(), Some("ex"));
            assert_eq!(local, "item");
        }
        other => panic!("expected QName, got {other:?}"),
    }
    let err = cast_with(&A::string("other:item"), K::QName, Some(&bindings)).unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::FONS0004);
}

// === Named targets ===

#[test]
fn cast_by_expanded_name() {
    let out = cast_to_name(&A::string("42"), &ExpandedName::xs("short"), None).unwrap();
    assert_eq!(out.type_name(), "xs:short");
    let abstract_target = cast_to_name(&A::string("1"), &ExpandedName::xs("anyAtomicType"), None);
    assert_eq!(abstract_target.unwrap_err().code_enum(), ErrorCode::XPST0080);
    let unknown = cast_to_name(&A::string("1"), &ExpandedName::xs("nonsense"), None);
    assert_eq!(unknown.unwrap_err().code_enum(), ErrorCode::XPST0051);
}
