use rstest::rstest;
use xpath2_types::consts::{FNS, XS};
use xpath2_types::engine::functions::accessors::effective_boolean_value;
use xpath2_types::{
    AtomicKind as K, ErrorCode, ErrorKind, ExpandedName, FunctionLibrary, FunctionSignature, IntegerKind,
    Occurrence, ParamTypeSpec, SimpleNode, StaticContext, StaticContextBuilder, XdmAtomicValue as A, XdmItem,
    XdmSequence, XsInteger,
};

type N = SimpleNode;
type I = XdmItem<N>;

fn ctx() -> StaticContext {
    StaticContextBuilder::new()
        .with_namespace("ex", "urn:example")
        .build()
}

fn atom(value: A) -> XdmSequence<N> {
    vec![I::Atomic(value)]
}

fn dec(text: &str) -> A {
    A::Decimal(text.parse().unwrap())
}

fn call_in(lib: &FunctionLibrary<N>, name: ExpandedName, args: Vec<XdmSequence<N>>) -> Result<XdmSequence<N>, xpath2_types::Error> {
    lib.evaluate(&name, &args, &ctx())
}

fn call(name: &str, args: Vec<XdmSequence<N>>) -> Result<XdmSequence<N>, xpath2_types::Error> {
    call_in(&FunctionLibrary::with_builtins(), ExpandedName::fn_name(name), args)
}

fn eval_atomic(name: &str, args: Vec<XdmSequence<N>>) -> Option<A> {
    let out = call(name, args).unwrap_or_else(|e| panic!("fn:{name}: {e}"));
    match out.as_slice() {
        [] => None,
        [I::Atomic(a)] => Some(a.clone()),
        other => panic!("expected at most one atomic, got {other:?}"),
    }
}

fn expect_err(name: &str, args: Vec<XdmSequence<N>>, code: ErrorCode) -> ErrorKind {
    match call(name, args) {
        Ok(out) => panic!("expected {code}, got {out:?}"),
        Err(e) => {
            assert_eq!(e.code_enum(), code, "{e}");
            e.kind
        }
    }
}

// === Registry ===

#[test]
fn registry_lookup() {
    let lib = FunctionLibrary::<N>::with_builtins();
    assert!(!lib.is_empty());
    assert_eq!(lib.arities(&ExpandedName::fn_name("round-half-to-even")), vec![1, 2]);
    assert_eq!(lib.arities(&ExpandedName::fn_name("adjust-date-to-timezone")), vec![1, 2]);
    let sig = lib.signature(&ExpandedName::fn_name("dateTime"), 2).unwrap();
    assert_eq!(sig.to_string(), "fn:dateTime(xs:date?, xs:time?)");
    assert!(lib.signature(&ExpandedName::xs("gMonthDay"), 1).is_some());
    assert!(lib.signature(&ExpandedName::xs("unsignedShort"), 1).is_some());
    assert!(lib.signatures().count() >= lib.len());
}

#[test]
fn unknown_function_or_arity() {
    let kind = expect_err("no-such-function", vec![], ErrorCode::XPST0017);
    assert_eq!(kind, ErrorKind::Arity);
    expect_err("abs", vec![atom(A::integer(1)), atom(A::integer(2))], ErrorCode::XPST0017);
}

#[test]
fn default_function_namespace_applies_to_unprefixed_names() {
    let lib = FunctionLibrary::<N>::with_builtins();
    let ctx = StaticContextBuilder::new().with_default_function_namespace(FNS).build();
    let out = lib
        .evaluate(&ExpandedName::new(None, "abs"), &[atom(A::integer(-2))], &ctx)
        .unwrap();
    assert_eq!(out, atom(A::integer(2)));
}

#[test]
fn custom_registration_replaces_same_arity() {
    let mut lib = FunctionLibrary::<N>::new();
    assert!(lib.is_empty());
    let name = ExpandedName::new(Some("urn:test".into()), "answer");
    lib.register(FunctionSignature::new(name.clone(), vec![]), |_, _| Ok(atom(A::integer(1))));
    lib.register(FunctionSignature::new(name.clone(), vec![]), |_, _| Ok(atom(A::integer(42))));
    lib.register(
        FunctionSignature::new(name.clone(), vec![ParamTypeSpec::integer(Occurrence::ExactlyOne)]),
        |_, args| Ok(args[0].clone()),
    );
    assert_eq!(lib.len(), 2);
    assert_eq!(call_in(&lib, name.clone(), vec![]).unwrap(), atom(A::integer(42)));
    let out = call_in(&lib, name, vec![atom(A::UntypedAtomic("7".into()))]).unwrap();
    assert_eq!(out, atom(A::integer(7)));
}

// === Argument conversion ===

#[rstest]
#[case(vec![], ErrorKind::Cardinality)]
#[case(vec![I::Atomic(A::integer(1)), I::Atomic(A::integer(2))], ErrorKind::Cardinality)]
#[case(vec![I::Atomic(A::string("x"))], ErrorKind::Type)]
#[case(vec![I::Atomic(A::from_lexical(K::Date, "2001-01-01").unwrap())], ErrorKind::Type)]
fn exactly_one_integer_parameter(#[case] precision: XdmSequence<N>, #[case] kind: ErrorKind) {
    let got = expect_err("round-half-to-even", vec![atom(A::Double(1.25)), precision], ErrorCode::XPTY0004);
    assert_eq!(got, kind);
}

#[test]
fn conversion_failure_keeps_cause() {
    let err = call("year-from-date", vec![atom(A::integer(3))]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
    let cause = err.source.as_ref().expect("cause attached");
    assert!(cause.to_string().contains("XPTY0004"));
}

#[test]
fn subtypes_are_accepted_unchanged() {
    let byte = A::Integer(XsInteger::new(IntegerKind::Byte, 3).unwrap());
    let out = eval_atomic("round-half-to-even", vec![atom(A::Double(2.5)), atom(byte)]).unwrap();
    assert_eq!(out, A::Double(2.5));
    let out = eval_atomic("days-from-duration", vec![atom(A::from_lexical(K::DayTimeDuration, "P2D").unwrap())]);
    assert_eq!(out, Some(A::integer(2)));
}

#[test]
fn any_uri_promotes_to_string() {
    let out = eval_atomic("compare", vec![atom(A::AnyUri("a".into())), atom(A::string("b"))]);
    assert_eq!(out, Some(A::integer(-1)));
}

#[test]
fn nodes_are_atomized() {
    let typed = SimpleNode::typed(A::from_lexical(K::Date, "2001-02-03").unwrap());
    assert_eq!(eval_atomic("day-from-date", vec![vec![I::Node(typed)]]), Some(A::integer(3)));
    let untyped = SimpleNode::text("P1Y6M");
    assert_eq!(eval_atomic("months-from-duration", vec![vec![I::Node(untyped)]]), Some(A::integer(6)));
}

// === Numeric functions ===

#[rstest]
#[case("abs", A::integer(-3), A::integer(3))]
#[case("abs", A::Integer(XsInteger::new(IntegerKind::Byte, -3).unwrap()), A::integer(3))]
#[case("abs", A::Double(-0.0), A::Double(0.0))]
#[case("abs", dec("-1.50"), dec("1.5"))]
#[case("ceiling", dec("10.5"), dec("11"))]
#[case("ceiling", dec("-10.5"), dec("-10"))]
#[case("floor", dec("10.5"), dec("10"))]
#[case("floor", dec("-10.5"), dec("-11"))]
#[case("floor", A::Float(-0.5), A::Float(-1.0))]
#[case("round", dec("2.5"), dec("3"))]
#[case("round", dec("2.4999"), dec("2"))]
#[case("round", dec("-2.5"), dec("-2"))]
#[case("round", A::Double(-7.5), A::Double(-7.0))]
#[case("round", A::integer(5), A::integer(5))]
#[case("round-half-to-even", dec("0.5"), dec("0"))]
#[case("round-half-to-even", dec("1.5"), dec("2"))]
#[case("round-half-to-even", dec("2.5"), dec("2"))]
#[case("round-half-to-even", A::Double(-2.5), A::Double(-2.0))]
fn unary_numeric(#[case] name: &str, #[case] arg: A, #[case] expected: A) {
    let got = eval_atomic(name, vec![atom(arg)]).unwrap();
    assert_eq!(got.kind(), expected.kind());
    assert_eq!(got, expected);
}

#[test]
fn round_untyped_goes_through_double() {
    assert_eq!(eval_atomic("round", vec![atom(A::UntypedAtomic("2.5".into()))]), Some(A::Double(3.0)));
    assert_eq!(eval_atomic("floor", vec![vec![]]), None);
    let round_neg = eval_atomic("round", vec![atom(A::Double(-0.4))]).unwrap();
    assert_eq!(round_neg.string_value(), "-0");
}

#[rstest]
#[case(A::Double(3.567812e3), 2, "3567.81")]
#[case(A::Double(4.7564e-3), 2, "0")]
#[case(dec("35612.25"), -2, "35600")]
#[case(dec("1.125"), 2, "1.12")]
#[case(A::integer(12345), -2, "12300")]
#[case(A::integer(12350), -2, "12400")]
#[case(dec("1.5"), 100, "1.5")]
fn round_half_to_even_with_precision(#[case] arg: A, #[case] precision: i128, #[case] expected: &str) {
    let got = eval_atomic("round-half-to-even", vec![atom(arg), atom(A::integer(precision))]).unwrap();
    assert_eq!(got.string_value(), expected);
}

#[test]
fn abs_overflow() {
    expect_err("abs", vec![atom(A::integer(i128::MIN))], ErrorCode::FOAR0002);
}

// === QNames ===

#[test]
fn qname_construction() {
    let q = eval_atomic(
        "QName",
        vec![atom(A::string("http://www.example.com/example")), atom(A::string("ht:person"))],
    )
    .unwrap();
    assert_eq!(
        q,
        A::QName {
            ns_uri: Some("http://www.example.com/example".into()),
            prefix: Some("ht".into()),
            local: "person".into()
        }
    );
    assert_eq!(eval_atomic("local-name-from-QName", vec![atom(q.clone())]), Some(A::string("person")));
    assert_eq!(eval_atomic("prefix-from-QName", vec![atom(q.clone())]), Some(A::string("ht")));
    assert_eq!(
        eval_atomic("namespace-uri-from-QName", vec![atom(q)]),
        Some(A::AnyUri("http://www.example.com/example".into()))
    );

    let unqualified = eval_atomic("QName", vec![vec![], atom(A::string("person"))]).unwrap();
    assert_eq!(eval_atomic("prefix-from-QName", vec![atom(unqualified.clone())]), None);
    assert_eq!(eval_atomic("namespace-uri-from-QName", vec![atom(unqualified)]), Some(A::AnyUri(String::new())));
}

#[rstest]
#[case("", "ns:person")]
#[case("urn:x", "1bad")]
#[case("urn:x", "a:b:c")]
fn qname_invalid(#[case] uri: &str, #[case] lexical: &str) {
    expect_err("QName", vec![atom(A::string(uri)), atom(A::string(lexical))], ErrorCode::FOCA0002);
}

// === Accessors ===

#[test]
fn string_and_data() {
    assert_eq!(eval_atomic("string", vec![vec![]]), Some(A::string("")));
    assert_eq!(eval_atomic("string", vec![vec![I::Node(SimpleNode::text("abc"))]]), Some(A::string("abc")));
    assert_eq!(eval_atomic("string", vec![atom(A::Double(1e6))]), Some(A::string("1.0E6")));

    let typed = A::from_lexical(K::GMonthDay, "--12-25").unwrap();
    let out = call("data", vec![vec![I::Node(SimpleNode::typed(typed.clone())), I::Node(SimpleNode::text("x"))]]).unwrap();
    assert_eq!(out, vec![I::Atomic(typed), I::Atomic(A::UntypedAtomic("x".into()))]);
}

#[rstest]
#[case(vec![], false)]
#[case(vec![I::Node(SimpleNode::text(""))], true)]
#[case(vec![I::Atomic(A::string(""))], false)]
#[case(vec![I::Atomic(A::Double(f64::NAN))], false)]
#[case(vec![I::Atomic(A::integer(2))], true)]
#[case(vec![I::Node(SimpleNode::text("a")), I::Atomic(A::integer(0))], true)]
fn effective_boolean(#[case] seq: XdmSequence<N>, #[case] expected: bool) {
    assert_eq!(effective_boolean_value(&seq).unwrap(), expected);
    assert_eq!(eval_atomic("boolean", vec![seq]), Some(A::Boolean(expected)));
}

#[rstest]
#[case(vec![I::Atomic(A::string("a")), I::Atomic(A::string("b"))])]
#[case(vec![I::Atomic(A::from_lexical(K::Date, "2001-01-01").unwrap())])]
fn effective_boolean_errors(#[case] seq: XdmSequence<N>) {
    expect_err("boolean", vec![seq], ErrorCode::FORG0006);
}

#[rstest]
#[case("abc", "abd", -1)]
#[case("abc", "abc", 0)]
#[case("b", "a", 1)]
fn compare_codepoints(#[case] a: &str, #[case] b: &str, #[case] expected: i128) {
    assert_eq!(eval_atomic("compare", vec![atom(A::string(a)), atom(A::string(b))]), Some(A::integer(expected)));
}

#[test]
fn compare_with_empty() {
    assert_eq!(eval_atomic("compare", vec![vec![], atom(A::string("a"))]), None);
}

// === Constructor functions ===

fn construct(local: &str, arg: XdmSequence<N>) -> Result<XdmSequence<N>, xpath2_types::Error> {
    let lib = FunctionLibrary::<N>::with_builtins();
    call_in(&lib, ExpandedName::new(Some(XS.to_string()), local), vec![arg])
}

#[test]
fn constructors() {
    let out = construct("positiveInteger", atom(A::string("5"))).unwrap();
    assert_eq!(out[..], [I::Atomic(A::Integer(XsInteger::new(IntegerKind::PositiveInteger, 5).unwrap()))]);

    let err = construct("positiveInteger", atom(A::string("0"))).unwrap_err();
    assert_eq!((err.code_enum(), err.kind), (ErrorCode::FORG0001, ErrorKind::Facet));

    let out = construct("gMonthDay", atom(A::from_lexical(K::Date, "2004-12-25Z").unwrap())).unwrap();
    assert_eq!(out[0].to_string(), "--12-25Z");

    assert_eq!(construct("date", vec![]).unwrap(), vec![]);

    let err = construct("gMonthDay", atom(A::from_lexical(K::Time, "12:00:00").unwrap())).unwrap_err();
    assert_eq!((err.code_enum(), err.kind), (ErrorCode::XPTY0004, ErrorKind::IllegalCast));
}

#[test]
fn qname_constructor_uses_context_namespaces() {
    let out = construct("QName", atom(A::string("ex:item"))).unwrap();
    match &out[..] {
        [I::Atomic(A::QName { ns_uri, local, .. })] => {
            assert_eq!(ns_uri.as_deref(), Some("urn:example"));
            assert_eq!(local, "item");
        }
        other => panic!("unexpected {other:?}"),
    }
    let err = construct("QName", atom(A::string("zz:item"))).unwrap_err();
    assert_eq!(err.code_enum(), ErrorCode::FONS0004);
}
