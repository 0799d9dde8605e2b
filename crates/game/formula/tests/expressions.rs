use game_formula::{
    DetachedHost, EvalError, FormulaError, ParseError, Registry, TreeBuilder, Value,
    resolve_str, resolve_tokens, token::tokenize,
};

fn number(expr: &str) -> f64 {
    let mut host = DetachedHost::new();
    resolve_str(Registry::shared(), &mut host, expr)
        .unwrap()
        .as_number()
        .unwrap()
}

fn resolve(expr: &str) -> Result<Value, FormulaError> {
    let mut host = DetachedHost::new();
    resolve_str(Registry::shared(), &mut host, expr)
}

#[test]
fn arithmetic_follows_operator_precedence() {
    assert_eq!(number("10*13+10"), 140.0);
    assert_eq!(number("10-13"), -3.0);
    assert_eq!(number("10^3"), 1000.0);
    assert_eq!(number("10+10^3+10"), 1020.0);
    assert_eq!(number("2*(3+4)"), 14.0);
    assert_eq!(number("20/4/5"), 1.0);
}

#[test]
fn nested_functions() {
    assert_eq!(number("MAX(10,20)"), 20.0);
    assert_eq!(number("MAX(10,MAX(3,4))"), 10.0);
    assert_eq!(number("IF(MAX(10,3)>3, IF(10>3,10,20), 30)"), 10.0);
    assert_eq!(
        resolve("ARRAY(10,MAX(10,20),10)").unwrap(),
        Value::Array(vec![10.0.into(), 20.0.into(), 10.0.into()])
    );
}

#[test]
fn not_and_comparison() {
    // '+' binds tighter than '>', so the comparison is 10 > 11.
    assert_eq!(resolve("10>3+8").unwrap(), Value::Boolean(false));
    assert_eq!(resolve("!(10>3+8)").unwrap(), Value::Boolean(true));
    assert_eq!(resolve("!10>3+8").unwrap(), Value::Boolean(true));
    assert_eq!(resolve("3=3").unwrap(), Value::Boolean(true));
}

#[test]
fn unary_minus() {
    assert_eq!(number("-(10-3*8)"), 14.0);
    assert_eq!(number("-MAX(1,2)"), -2.0);
    assert_eq!(number("2*-3"), -6.0);
    assert!(matches!(
        resolve("-(10>3+8)"),
        Err(FormulaError::Eval(EvalError::Type(_)))
    ));
}

#[test]
fn lowered_unary_minus_binds_at_multiplicative_precedence() {
    // Negative literals bind to the number itself.
    assert_eq!(number("2^-3"), 0.125);
    // `-(3)` reads as `-1*(3)`, so the exponent only takes the `-1`.
    assert_eq!(number("2^-(3)"), 1.5);
    assert_eq!(number("2^(-(3))"), 0.125);
}

#[test]
fn minus_directly_after_function_is_a_known_limitation() {
    assert_eq!(
        resolve("MAX-(1)"),
        Err(FormulaError::Parse(ParseError::MinusAfterFunction {
            function: "MAX".into()
        }))
    );
}

#[test]
fn division_by_zero_does_not_raise() {
    assert_eq!(number("1/0"), f64::INFINITY);
    assert!(number("0/0").is_nan());
}

#[test]
fn tokens_can_be_resolved_directly() {
    let tokens = tokenize(Registry::shared(), "MIN(4,2)*3").unwrap();
    let mut host = DetachedHost::new();
    let value = resolve_tokens(Registry::shared(), &mut host, &tokens).unwrap();
    assert_eq!(value, Value::Number(6.0));
}

#[test]
fn cloned_tree_keeps_its_shape() {
    let tree = TreeBuilder::new(Registry::shared())
        .build_str("11+10")
        .unwrap();
    let copy = tree.clone();

    assert_eq!(copy.value().as_operator().unwrap().symbol(), "+");
    let leaves: Vec<f64> = copy
        .children()
        .iter()
        .map(|child| child.value().as_number().unwrap())
        .collect();
    assert_eq!(leaves, vec![11.0, 10.0]);
}

#[test]
fn custom_registry_without_functions() {
    let registry = Registry::empty();
    let mut host = DetachedHost::new();
    // With no functions registered, MAX is just a key followed by '('.
    assert_eq!(
        resolve_str(&registry, &mut host, "MAX(1)"),
        Err(FormulaError::Parse(ParseError::UnknownFunction {
            name: "MAX".into()
        }))
    );
}
