use glyphon_grammar::{Expr, Grammar, Qualifier, Translator};
use glyphon_streams::{SymbolStream, Token};
use glyphon_tree::Node;

use crate::{NoRecoveryErrorHandler, Parser, ParserOptions, ParserState, RegularErrorHandler};

struct VecTokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl VecTokenStream {
    fn new(tokens: Vec<Token>) -> Self {
        VecTokenStream { tokens, pos: 0 }
    }
}

impl SymbolStream for VecTokenStream {
    type Symbol = Token;

    fn peek(&mut self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn next(&mut self) -> Token {
        let t = self.peek();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn done(&self) -> bool {
        self.pos >= self.tokens.len() - 1
    }

    fn reset(&mut self) {
        self.pos = 0;
    }

    fn pos(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].pos
    }
}

fn charset(c: char) -> Expr {
    Expr::Charset { ranges: vec![(c as u32, c as u32)], negated: false }
}

/// `A := "a"`, `B := "b"`, `C := "c"`, `ABC := token(A) token(B) token(C)`,
/// `ABCABC := name(ABC) name(ABC)`. The grammar used throughout
/// `original_source/tests/parameterized_tests/error_handler_tests.h`,
/// restricted to the rules spec.md's S3/S4 scenarios actually name.
fn abcabc_grammar() -> Grammar {
    let mut t = Translator::new();
    t.add_lpr_decl("A", Qualifier::None);
    t.add_lpr("A", vec![charset('a')]);
    t.add_lpr_decl("B", Qualifier::None);
    t.add_lpr("B", vec![charset('b')]);
    t.add_lpr_decl("C", Qualifier::None);
    t.add_lpr("C", vec![charset('c')]);
    t.add_ppr_decl("ABC");
    t.add_ppr("ABC", vec![Expr::Sequence(vec![Expr::Token("A".into()), Expr::Token("B".into()), Expr::Token("C".into())])]);
    t.add_ppr_decl("ABCABC");
    t.add_ppr("ABCABC", vec![Expr::Sequence(vec![Expr::Name("ABC".into()), Expr::Name("ABC".into())])]);
    t.get_result().expect("grammar should build")
}

fn tok(grammar: &Grammar, lpr: &str, pos: usize, len: usize) -> Token {
    Token::normal(grammar.lpr(lpr).unwrap().token_id(), pos, len)
}

#[test]
fn succeeds_on_well_formed_input() {
    let g = abcabc_grammar();
    let tokens = vec![tok(&g, "A", 0, 1), tok(&g, "B", 1, 1), tok(&g, "C", 2, 1), Token::end(3)];
    let mut parser = Parser::new();
    let tree = parser.parse(&g, "ABC", VecTokenStream::new(tokens), ParserOptions::default()).unwrap();
    assert_eq!(parser.state(), ParserState::Succeeded);
    match tree.root().unwrap() {
        Node::Syntactic { children, .. } => assert_eq!(children.len(), 3),
        other => panic!("expected syntactic root, got {other:?}"),
    }
}

/// Scenario S4: no-recovery handler aborts on the first mismatch,
/// keeping whatever was already matched in the failing rule and
/// attaching `abort` to its parent.
#[test]
fn no_recovery_handler_aborts_and_keeps_partial_structure() {
    let g = abcabc_grammar();
    // "a_bcabc": A@0, an unrecognized glyph coalesced into one
    // failure token, then B,C,A,B,C.
    let tokens = vec![
        tok(&g, "A", 0, 1),
        Token::failure(1, 1),
        tok(&g, "B", 2, 1),
        tok(&g, "C", 3, 1),
        tok(&g, "A", 4, 1),
        tok(&g, "B", 5, 1),
        tok(&g, "C", 6, 1),
        Token::end(7),
    ];
    let options = ParserOptions { error_handler: Some(Box::new(NoRecoveryErrorHandler::new())) };
    let mut parser = Parser::new();
    let tree = parser.parse(&g, "ABCABC", VecTokenStream::new(tokens), options).unwrap();
    assert_eq!(parser.state(), ParserState::Aborted);

    match tree.root().unwrap() {
        Node::Syntactic { children, .. } => {
            assert_eq!(children.len(), 2);
            match &children[0] {
                Node::Syntactic { children: abc_children, .. } => assert_eq!(abc_children.len(), 1),
                other => panic!("expected the partially matched ABC, got {other:?}"),
            }
            assert_eq!(children[1], Node::Abort);
        }
        other => panic!("expected syntactic root, got {other:?}"),
    }
}

/// Scenario S3: the regular handler treats one bad token as noise,
/// emits it as a `skip` leaf, and continues the same production.
#[test]
fn regular_handler_skips_one_bad_token_and_continues() {
    let g = abcabc_grammar();
    // "abca_bc": first ABC matches abc; second ABC matches its A,
    // hits an unrecognized glyph where B was expected, skips it, then
    // matches b and c.
    let tokens = vec![
        tok(&g, "A", 0, 1),
        tok(&g, "B", 1, 1),
        tok(&g, "C", 2, 1),
        tok(&g, "A", 3, 1),
        Token::failure(4, 1),
        tok(&g, "B", 5, 1),
        tok(&g, "C", 6, 1),
        Token::end(7),
    ];
    let options = ParserOptions { error_handler: Some(Box::new(RegularErrorHandler::new(g.clone()))) };
    let mut parser = Parser::new();
    let tree = parser.parse(&g, "ABCABC", VecTokenStream::new(tokens), options).unwrap();
    assert_eq!(parser.state(), ParserState::Succeeded);

    match tree.root().unwrap() {
        Node::Syntactic { children, .. } => {
            assert_eq!(children.len(), 2);
            match &children[1] {
                Node::Syntactic { children: abc_children, .. } => {
                    assert_eq!(abc_children.len(), 4);
                    assert_eq!(abc_children[1], Node::Skip { len: 1 });
                }
                other => panic!("expected the recovered second ABC, got {other:?}"),
            }
        }
        other => panic!("expected syntactic root, got {other:?}"),
    }
}

/// Without a handler at all, a mismatch behaves exactly like
/// `NoRecoveryErrorHandler`.
#[test]
fn no_handler_configured_aborts_like_no_recovery() {
    let g = abcabc_grammar();
    let tokens = vec![tok(&g, "A", 0, 1), Token::failure(1, 1), Token::end(2)];
    let mut parser = Parser::new();
    let tree = parser.parse(&g, "ABC", VecTokenStream::new(tokens), ParserOptions::default()).unwrap();
    assert_eq!(parser.state(), ParserState::Aborted);
    match tree.root().unwrap() {
        Node::Syntactic { children, .. } => assert_eq!(children, &vec![Node::Lexical { lpr: g.lpr("A").unwrap(), pos: 0, len: 1 }, Node::Abort]),
        other => panic!("expected syntactic root, got {other:?}"),
    }
}

#[test]
fn unknown_start_rule_returns_none() {
    let g = abcabc_grammar();
    let tokens = vec![Token::end(0)];
    let mut parser = Parser::new();
    assert!(parser.parse(&g, "NOPE", VecTokenStream::new(tokens), ParserOptions::default()).is_none());
    assert_eq!(parser.state(), ParserState::Idle);
}
