use chrono::FixedOffset;
use rstest::rstest;
use xpath2_types::{
    AtomicKind as K, ComparisonOp as Op, ErrorCode, XdmAtomicValue as A, compare_atomic,
    general_compare_atomic, value_eq,
};

fn v(kind: K, text: &str) -> A {
    A::from_lexical(kind, text).unwrap()
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn tz_hours(h: i32) -> FixedOffset {
    FixedOffset::east_opt(h * 3600).unwrap()
}

fn expect_type_error(a: &A, b: &A, op: Op) {
    match compare_atomic(a, b, op, utc()) {
        Ok(r) => panic!("expected XPTY0004, got {r}"),
        Err(e) => assert_eq!(e.code_enum(), ErrorCode::XPTY0004, "{e}"),
    }
}

// === Incomparable families ===

#[rstest]
#[case(v(K::GMonthDay, "--12-25"), v(K::Time, "12:00:00"), Op::Eq)]
#[case(v(K::GMonthDay, "--12-25"), v(K::GMonthDay, "--12-26"), Op::Lt)]
#[case(v(K::GYear, "2001"), v(K::GYearMonth, "2001-01"), Op::Eq)]
#[case(v(K::Date, "2001-01-01"), v(K::DateTime, "2001-01-01T00:00:00"), Op::Eq)]
#[case(A::string("1"), A::integer(1), Op::Eq)]
#[case(A::UntypedAtomic("1".into()), A::integer(1), Op::Eq)]
#[case(v(K::Duration, "P1Y"), v(K::Duration, "P2Y"), Op::Lt)]
#[case(v(K::YearMonthDuration, "P1Y"), v(K::DayTimeDuration, "P1D"), Op::Gt)]
#[case(v(K::QName, "xs:a"), v(K::QName, "xs:b"), Op::Lt)]
#[case(A::Boolean(true), A::integer(1), Op::Eq)]
fn incomparable(#[case] a: A, #[case] b: A, #[case] op: Op) {
    expect_type_error(&a, &b, op);
}

// === Numerics ===

#[rstest]
#[case(A::integer(1), A::Double(1.0), Op::Eq, true)]
#[case(A::Float(0.1), A::Double(0.1), Op::Eq, false)]
#[case(A::integer(2), A::Decimal("2.5".parse().unwrap()), Op::Lt, true)]
#[case(A::Double(f64::NAN), A::Double(f64::NAN), Op::Eq, false)]
#[case(A::Double(f64::NAN), A::Double(f64::NAN), Op::Ne, true)]
#[case(A::Double(f64::NAN), A::integer(1), Op::Lt, false)]
#[case(A::Double(0.0), A::Double(-0.0), Op::Eq, true)]
#[case(A::Double(f64::INFINITY), A::integer(i128::MAX), Op::Gt, true)]
fn numeric_comparisons(#[case] a: A, #[case] b: A, #[case] op: Op, #[case] expected: bool) {
    assert_eq!(compare_atomic(&a, &b, op, utc()).unwrap(), expected);
}

// === Strings, booleans and names ===

#[rstest]
#[case(A::string("abc"), A::string("abd"), Op::Lt, true)]
#[case(A::AnyUri("http://a".into()), A::string("http://a"), Op::Eq, true)]
#[case(A::UntypedAtomic("x".into()), A::string("x"), Op::Eq, true)]
#[case(A::Boolean(false), A::Boolean(true), Op::Lt, true)]
#[case(v(K::QName, "xs:integer"), A::QName { ns_uri: Some("http://www.w3.org/2001/XMLSchema".into()), prefix: None, local: "integer".into() }, Op::Eq, true)]
#[case(v(K::QName, "xs:integer"), v(K::QName, "xs:int"), Op::Ne, true)]
fn string_like(#[case] a: A, #[case] b: A, #[case] op: Op, #[case] expected: bool) {
    assert_eq!(compare_atomic(&a, &b, op, utc()).unwrap(), expected);
}

// === Durations ===

#[rstest]
#[case(v(K::Duration, "P1Y"), v(K::Duration, "P12M"), Op::Eq, true)]
#[case(v(K::Duration, "PT24H"), v(K::DayTimeDuration, "P1D"), Op::Eq, true)]
#[case(v(K::YearMonthDuration, "P0Y"), v(K::DayTimeDuration, "PT0S"), Op::Eq, true)]
#[case(v(K::YearMonthDuration, "P1Y"), v(K::DayTimeDuration, "P365D"), Op::Eq, false)]
#[case(v(K::YearMonthDuration, "P1Y"), v(K::YearMonthDuration, "P13M"), Op::Lt, true)]
#[case(v(K::DayTimeDuration, "-PT1S"), v(K::DayTimeDuration, "PT0S"), Op::Lt, true)]
fn durations(#[case] a: A, #[case] b: A, #[case] op: Op, #[case] expected: bool) {
    assert_eq!(compare_atomic(&a, &b, op, utc()).unwrap(), expected);
}

// === Dates and times on the timeline ===

#[rstest]
#[case(v(K::DateTime, "2002-04-02T12:00:00-01:00"), v(K::DateTime, "2002-04-02T17:00:00+04:00"), Op::Eq, true)]
#[case(v(K::DateTime, "2002-04-02T23:00:00-04:00"), v(K::DateTime, "2002-04-03T02:00:00-01:00"), Op::Eq, true)]
#[case(v(K::Date, "2004-12-25-05:00"), v(K::Date, "2004-12-25Z"), Op::Gt, true)]
#[case(v(K::Date, "2004-12-25Z"), v(K::Date, "2004-12-26Z"), Op::Lt, true)]
#[case(v(K::Time, "08:00:00+09:00"), v(K::Time, "17:00:00-06:00"), Op::Eq, false)]
#[case(v(K::Time, "21:30:00+10:30"), v(K::Time, "06:00:00-05:00"), Op::Eq, true)]
#[case(v(K::GDay, "---12-05:00"), v(K::GDay, "---12Z"), Op::Eq, false)]
#[case(v(K::GMonth, "--12"), v(K::GMonth, "--12Z"), Op::Eq, true)]
fn temporal_utc_implicit(#[case] a: A, #[case] b: A, #[case] op: Op, #[case] expected: bool) {
    assert_eq!(compare_atomic(&a, &b, op, utc()).unwrap(), expected);
}

#[test]
fn implicit_timezone_places_naive_values() {
    let naive = v(K::GMonthDay, "--12-25");
    let zoned = v(K::GMonthDay, "--12-25Z");
    assert!(value_eq(&naive, &zoned, utc()).unwrap());
    assert!(!value_eq(&naive, &zoned, tz_hours(1)).unwrap());

    let naive = v(K::DateTime, "2002-04-02T12:00:00");
    let zoned = v(K::DateTime, "2002-04-02T17:00:00Z");
    assert!(value_eq(&naive, &zoned, tz_hours(-5)).unwrap());
    assert!(compare_atomic(&naive, &zoned, Op::Lt, utc()).unwrap());
}

// === General comparison ===

#[rstest]
#[case(A::UntypedAtomic("1".into()), A::integer(1), Op::Eq, true)]
#[case(A::UntypedAtomic("1.0".into()), A::Decimal("1".parse().unwrap()), Op::Eq, true)]
#[case(A::UntypedAtomic("10".into()), A::UntypedAtomic("9".into()), Op::Lt, true)]
#[case(A::UntypedAtomic("2001-01-01".into()), v(K::Date, "2001-01-02"), Op::Lt, true)]
#[case(A::string("b"), A::UntypedAtomic("a".into()), Op::Gt, true)]
fn general_comparisons(#[case] a: A, #[case] b: A, #[case] op: Op, #[case] expected: bool) {
    assert_eq!(general_compare_atomic(&a, &b, op, utc()).unwrap(), expected);
}

#[test]
fn general_comparison_cast_failure() {
    let err = general_compare_atomic(&A::UntypedAtomic("abc".into()), &A::integer(1), Op::Eq, utc()).unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::FORG0001);
}
