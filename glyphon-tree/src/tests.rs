use glyphon_grammar::{Expr, Grammar, Qualifier, Translator};

use crate::{Node, PatternBuilder, Tree, TreeBuilder};

fn charset(c: char) -> Expr {
    Expr::Charset { ranges: vec![(c as u32, c as u32)], negated: false }
}

/// `A := "a"`, `B := "b"`, `C := "c"`, `ABC := token(A) token(B) token(C)`.
fn abc_grammar() -> Grammar {
    let mut t = Translator::new();
    t.add_lpr_decl("A", Qualifier::None);
    t.add_lpr("A", vec![charset('a')]);
    t.add_lpr_decl("B", Qualifier::None);
    t.add_lpr("B", vec![charset('b')]);
    t.add_lpr_decl("C", Qualifier::None);
    t.add_lpr("C", vec![charset('c')]);
    t.add_ppr_decl("ABC");
    t.add_ppr("ABC", vec![Expr::Sequence(vec![Expr::Token("A".into()), Expr::Token("B".into()), Expr::Token("C".into())])]);
    t.get_result().expect("grammar should build")
}

#[test]
fn builder_produces_a_syntactic_root_with_lexical_children() {
    let g = abc_grammar();
    let abc = g.ppr("ABC").unwrap();
    let a = g.lpr("A").unwrap();
    let b = g.lpr("B").unwrap();
    let c = g.lpr("C").unwrap();

    let mut tb = TreeBuilder::new();
    tb.syntactic(abc.clone(), 0).lexical(a, 0, 1).lexical(b, 1, 1).lexical(c, 2, 1).close();
    let tree = tb.finish();

    match tree.root().unwrap() {
        Node::Syntactic { ppr, pos, children } => {
            assert_eq!(ppr, &abc);
            assert_eq!(*pos, 0);
            assert_eq!(children.len(), 3);
        }
        other => panic!("expected syntactic root, got {other:?}"),
    }
}

#[test]
fn bare_lexical_leaf_is_a_valid_whole_tree() {
    let g = abc_grammar();
    let a = g.lpr("A").unwrap();
    let mut tb = TreeBuilder::new();
    tb.lexical(a, 0, 1);
    let tree = tb.finish();
    assert_eq!(tree.roots.len(), 1);
    assert!(matches!(tree.roots[0], Node::Lexical { .. }));
}

#[test]
fn exact_pattern_matches_exact_tree() {
    let g = abc_grammar();
    let abc = g.ppr("ABC").unwrap();
    let a = g.lpr("A").unwrap();
    let b = g.lpr("B").unwrap();
    let c = g.lpr("C").unwrap();

    let tree = {
        let mut tb = TreeBuilder::new();
        tb.syntactic(abc.clone(), 0).lexical(a.clone(), 0, 1).lexical(b.clone(), 1, 1).lexical(c.clone(), 2, 1).close();
        tb.finish()
    };

    let pattern = {
        let mut pb = PatternBuilder::new();
        pb.syntactic(abc, 0).lexical(a, 0, 1).lexical(b, 1, 1).lexical(c, 2, 1).close();
        pb.finish()
    };

    assert!(pattern.matches(&tree));
}

#[test]
fn skip_pattern_matches_sum_of_consecutive_skip_leaves() {
    let g = abc_grammar();
    let abc = g.ppr("ABC").unwrap();
    let a = g.lpr("A").unwrap();

    let tree = {
        let mut tb = TreeBuilder::new();
        tb.syntactic(abc.clone(), 0).lexical(a.clone(), 0, 1).skip(5).skip(5).close();
        tb.finish()
    };

    let matches = {
        let mut pb = PatternBuilder::new();
        pb.syntactic(abc.clone(), 0).lexical(a.clone(), 0, 1).skip(10).close();
        pb.finish()
    };
    assert!(matches.matches(&tree));

    let wrong_sum = {
        let mut pb = PatternBuilder::new();
        pb.syntactic(abc, 0).lexical(a, 0, 1).skip(9).close();
        pb.finish()
    };
    assert!(!wrong_sum.matches(&tree));
}

#[test]
fn skip_zero_matches_absent_skip_node() {
    let g = abc_grammar();
    let abc = g.ppr("ABC").unwrap();
    let a = g.lpr("A").unwrap();

    let tree = {
        let mut tb = TreeBuilder::new();
        tb.syntactic(abc.clone(), 0).lexical(a.clone(), 0, 1).close();
        tb.finish()
    };
    let pattern = {
        let mut pb = PatternBuilder::new();
        pb.syntactic(abc, 0).lexical(a, 0, 1).skip(0).close();
        pb.finish()
    };
    assert!(pattern.matches(&tree));
}

#[test]
fn loose_syntactic_ignores_internal_shape_but_checks_span() {
    let g = abc_grammar();
    let abc = g.ppr("ABC").unwrap();
    let a = g.lpr("A").unwrap();

    let tree = {
        let mut tb = TreeBuilder::new();
        tb.syntactic(abc.clone(), 0).lexical(a, 0, 1).skip(9).close();
        tb.finish()
    };
    let pattern = {
        let mut pb = PatternBuilder::new();
        pb.loose_syntactic(abc, 0, 10);
        pb.finish()
    };
    assert!(pattern.matches(&tree));
}

#[test]
fn trailing_abort_is_tolerated_at_root_level() {
    let g = abc_grammar();
    let a = g.lpr("A").unwrap();

    let tree = {
        let mut tb = TreeBuilder::new();
        tb.lexical(a.clone(), 0, 1).abort();
        tb.finish()
    };
    let pattern = {
        let mut pb = PatternBuilder::new();
        pb.lexical(a, 0, 1);
        pb.finish()
    };
    assert!(pattern.matches(&tree));
}

#[test]
fn extra_trailing_content_other_than_abort_fails() {
    let g = abc_grammar();
    let a = g.lpr("A").unwrap();
    let b = g.lpr("B").unwrap();

    let tree = {
        let mut tb = TreeBuilder::new();
        tb.lexical(a.clone(), 0, 1).lexical(b, 1, 1);
        tb.finish()
    };
    let pattern = {
        let mut pb = PatternBuilder::new();
        pb.lexical(a, 0, 1);
        pb.finish()
    };
    assert!(!pattern.matches(&tree));
}

#[test]
fn missing_or_reordered_interior_content_fails() {
    let g = abc_grammar();
    let abc = g.ppr("ABC").unwrap();
    let a = g.lpr("A").unwrap();
    let b = g.lpr("B").unwrap();
    let c = g.lpr("C").unwrap();

    let tree = {
        let mut tb = TreeBuilder::new();
        tb.syntactic(abc.clone(), 0).lexical(a.clone(), 0, 1).lexical(c.clone(), 2, 1).close();
        tb.finish()
    };
    let pattern = {
        let mut pb = PatternBuilder::new();
        pb.syntactic(abc, 0).lexical(a, 0, 1).lexical(b, 1, 1).lexical(c, 2, 1).close();
        pb.finish()
    };
    assert!(!pattern.matches(&tree));
}
