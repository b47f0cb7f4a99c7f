use crate::{Expr, GrammarDiagnostic, Qualifier, Translator};

#[test]
fn builds_a_minimal_grammar() {
    let mut t = Translator::new();
    t.add_lpr_decl("A", Qualifier::None);
    t.add_lpr("A", vec![Expr::Charset { ranges: vec![(b'a' as u32, b'a' as u32)], negated: false }]);
    t.add_ppr_decl("start");
    t.add_ppr("start", vec![Expr::Token("A".to_string())]);
    let grammar = t.get_result().expect("well-formed grammar should build");
    assert_eq!(grammar.lpr_count(), 1);
    assert_eq!(grammar.ppr_count(), 1);
    let a = grammar.lpr("A").unwrap();
    assert_eq!(a.name(), "A");
    assert_eq!(a.qualifier(), Qualifier::None);
}

#[test]
fn duplicate_decl_is_a_diagnostic_and_build_fails() {
    let mut t = Translator::new();
    t.add_lpr_decl("A", Qualifier::None);
    t.add_lpr_decl("A", Qualifier::None);
    t.add_lpr("A", vec![Expr::Any]);
    assert!(t.get_result().is_none());
}

#[test]
fn missing_definition_is_reported() {
    let mut t = Translator::new();
    t.add_lpr_decl("A", Qualifier::None);
    // never calls add_lpr("A", ...)
    assert!(t.get_result().is_none());
}

#[test]
fn undeclared_rule_body_is_reported() {
    let mut t = Translator::new();
    t.add_lpr("GHOST", vec![Expr::Any]);
    assert!(t
        .diagnostics()
        .iter()
        .any(|d| matches!(d, GrammarDiagnostic::UndeclaredRule(name) if name == "GHOST")));
}

#[test]
fn cancel_suppresses_the_result_even_if_otherwise_valid() {
    let mut t = Translator::new();
    t.add_lpr_decl("A", Qualifier::None);
    t.add_lpr("A", vec![Expr::Any]);
    t.add_ppr_decl("start");
    t.add_ppr("start", vec![Expr::Token("A".to_string())]);
    t.cancel();
    assert!(t.get_result().is_none());
}

#[test]
fn kleene_star_desugars_into_a_working_table() {
    // sum = NUMBER ((PLUS | MINUS) NUMBER)*
    let mut t = Translator::new();
    t.add_lpr_decl("NUMBER", Qualifier::None);
    t.add_lpr("NUMBER", vec![Expr::Charset { ranges: vec![(b'0' as u32, b'9' as u32)], negated: false }]);
    t.add_lpr_decl("PLUS", Qualifier::None);
    t.add_lpr("PLUS", vec![Expr::Literal(vec!['+' as u32])]);
    t.add_lpr_decl("MINUS", Qualifier::None);
    t.add_lpr("MINUS", vec![Expr::Literal(vec!['-' as u32])]);

    t.add_ppr_decl("sum");
    t.add_ppr(
        "sum",
        vec![Expr::Sequence(vec![
            Expr::Token("NUMBER".to_string()),
            Expr::KleeneStar(Box::new(Expr::Sequence(vec![
                Expr::Token("PLUS".to_string()),
                Expr::Token("NUMBER".to_string()),
            ]))),
        ])],
    );

    let grammar = t.get_result().expect("sum grammar should build");
    let sum = grammar.ppr("sum").unwrap();
    let number = grammar.lpr("NUMBER").unwrap().token_id();
    let plus = grammar.lpr("PLUS").unwrap().token_id();
    assert!(grammar.syntactic_table().get_production(sum.id(), number).is_some());
    assert!(grammar.syntactic_table().first_set(sum.id()).unwrap().includes(number));
    let _ = plus;
}

#[test]
fn lookahead_requires_single_terminal_operand() {
    let mut t = Translator::new();
    t.add_lpr_decl("A", Qualifier::None);
    t.add_lpr_decl("B", Qualifier::None);
    t.add_lpr(
        "A",
        vec![Expr::Sequence(vec![
            Expr::Lookahead(Box::new(Expr::Name("B".to_string()))),
            Expr::Name("B".to_string()),
        ])],
    );
    t.add_lpr("B", vec![Expr::Charset { ranges: vec![(b'x' as u32, b'x' as u32)], negated: false }]);
    // `lookahead` over a non-terminal reference is not a single
    // terminal range, so this must be reported rather than silently
    // accepted.
    assert!(t.get_result().is_none());
}

#[test]
fn skip_and_support_qualifiers_format_with_a_tag() {
    let mut t = Translator::new();
    t.add_lpr_decl("WS", Qualifier::Skip);
    t.add_lpr("WS", vec![Expr::Charset { ranges: vec![(' ' as u32, ' ' as u32)], negated: false }]);
    t.add_lpr_decl("FRAGMENT", Qualifier::Support);
    t.add_lpr("FRAGMENT", vec![Expr::Any]);
    t.add_ppr_decl("start");
    t.add_ppr("start", vec![Expr::Token("WS".to_string())]);
    let grammar = t.get_result().unwrap();
    let ws = grammar.lpr("WS").unwrap();
    let fragment = grammar.lpr("FRAGMENT").unwrap();
    assert_eq!(format!("{ws}"), "[0] WS (skip)");
    assert_eq!(format!("{fragment}"), "[1] FRAGMENT (support)");
}
