use std::collections::BTreeMap;

use glyphon_symbols::{SymbolId, SymbolRange, SymbolSet, SymbolTraits};
use glyphon_tables::{Atom, Production};

use crate::GrammarDiagnostic;

/// The tree-shaped form a rule body's expression is built up into
/// before desugaring. This plays the role the spec's flat "spec
/// events" stream plays for a single rule body: `sequence`,
/// `lookahead`, `lookahead_not`, `not`, `optional`, `kleene_star` and
/// `kleene_plus` are exactly the structural event kinds, expressed
/// here as a recursive value rather than a push/pop event replay —
/// the same shape the teacher's own `bnf.rs` `Pattern`/`ProductionPattern`
/// trees take for a parsed rule body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// Matches any single symbol of the universe's terminal range.
    Any,
    /// A literal sequence of code points (LPR bodies only).
    Literal(Vec<u32>),
    /// An inclusive-range charset, optionally negated.
    Charset { ranges: Vec<(u32, u32)>, negated: bool },
    /// The universe's `end` pseudo-terminal.
    End,
    /// A reference to a lexer production rule used as a token
    /// (PPR bodies only).
    Token(String),
    /// The universe's `failure` pseudo-terminal (PPR bodies only).
    Failure,
    /// A reference to another rule in the same universe.
    Name(String),
    Sequence(Vec<Expr>),
    Lookahead(Box<Expr>),
    LookaheadNot(Box<Expr>),
    Not(Box<Expr>),
    Optional(Box<Expr>),
    KleeneStar(Box<Expr>),
    KleenePlus(Box<Expr>),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Universe {
    Glyph,
    Token,
}

/// Desugaring context for one universe's worth of rules: holds the
/// name table, the accumulated flat productions (with *relative*,
/// 0-based non-terminal indices — named rules first, then anonymous
/// ones allocated here), and diagnostics raised while walking
/// expressions (unresolved names, lookahead operands wider than one
/// terminal).
pub(crate) struct Ctx<'a> {
    universe: Universe,
    names: &'a BTreeMap<String, u32>,
    full_terminal: SymbolRange,
    end: SymbolId,
    failure: Option<SymbolId>,
    next_anon: u32,
    pub productions: Vec<Production>,
    pub diagnostics: Vec<GrammarDiagnostic>,
}

impl<'a> Ctx<'a> {
    pub fn new(universe: Universe, names: &'a BTreeMap<String, u32>, named_count: u32, traits: &SymbolTraits) -> Self {
        Ctx {
            universe,
            names,
            full_terminal: traits.terminal_range(),
            end: traits.end,
            failure: traits.failure,
            next_anon: named_count,
            productions: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn anonymous_count(&self) -> u32 {
        self.next_anon
    }

    fn alloc_anon(&mut self) -> u32 {
        let id = self.next_anon;
        self.next_anon += 1;
        id
    }

    /// Adds one production per resulting alternative for `non_terminal`.
    pub fn add_rule_alternative(&mut self, non_terminal: u32, alt: &Expr) {
        for atoms in self.desugar(alt) {
            self.productions.push(Production::new(SymbolId(non_terminal), atoms));
        }
    }

    fn single_range_operand(&mut self, inner: &Expr) -> Option<SymbolRange> {
        let alts = self.desugar(inner);
        if alts.len() == 1 && alts[0].len() == 1 {
            if let glyphon_tables::AtomKind::Terminal(range) = alts[0][0].kind {
                return Some(range);
            }
        }
        self.diagnostics.push(GrammarDiagnostic::InvalidLookaheadOperand);
        None
    }

    fn ranges_to_atoms(&self, set: &SymbolSet, assertion: bool) -> Vec<Vec<Atom>> {
        set.ranges()
            .iter()
            .map(|r| {
                let mut atom = Atom::terminal(*r);
                if assertion {
                    atom = atom.assert();
                }
                vec![atom]
            })
            .collect()
    }

    fn charset_set(&self, ranges: &[(u32, u32)], negated: bool) -> SymbolSet {
        let mut set = SymbolSet::new();
        for &(a, b) in ranges {
            set.add_range(SymbolRange::new(SymbolId(a), SymbolId(b)));
        }
        if negated {
            let mut universe_set = SymbolSet::from_range(self.full_terminal);
            universe_set.remove_set(&set);
            universe_set
        } else {
            set
        }
    }

    /// Desugar one expression node into its alternative atom
    /// sequences. Combinators that need to recurse (`optional`,
    /// `kleene_star`, `kleene_plus`, `not` with a non-terminal
    /// operand) allocate an anonymous non-terminal and push its
    /// productions into `self.productions`, returning a single
    /// alternative that references it — the same shape
    /// `lapex-parser/src/grammar_builder.rs` uses for `ZeroOrMany`.
    pub fn desugar(&mut self, expr: &Expr) -> Vec<Vec<Atom>> {
        match expr {
            Expr::Any => vec![vec![Atom::terminal(self.full_terminal)]],
            Expr::Literal(codepoints) => {
                vec![codepoints
                    .iter()
                    .map(|&cp| Atom::terminal(SymbolRange::single(SymbolId(cp))))
                    .collect()]
            }
            Expr::Charset { ranges, negated } => {
                let set = self.charset_set(ranges, *negated);
                self.ranges_to_atoms(&set, false)
            }
            Expr::End => vec![vec![Atom::terminal(SymbolRange::single(self.end))]],
            Expr::Failure => match self.failure {
                Some(f) => vec![vec![Atom::terminal(SymbolRange::single(f))]],
                None => {
                    self.diagnostics.push(GrammarDiagnostic::FailureNotInUniverse);
                    vec![vec![]]
                }
            },
            Expr::Token(name) => {
                if self.universe != Universe::Token {
                    self.diagnostics.push(GrammarDiagnostic::TokenExpressionInLprBody(name.clone()));
                    return vec![vec![]];
                }
                match self.names.get(name) {
                    Some(&id) => vec![vec![Atom::terminal(SymbolRange::single(SymbolId(id)))]],
                    None => {
                        self.diagnostics.push(GrammarDiagnostic::UnresolvedName(name.clone()));
                        vec![vec![]]
                    }
                }
            }
            Expr::Name(name) => match self.names.get(name) {
                Some(&relative) => vec![vec![Atom::non_terminal(SymbolId(relative))]],
                None => {
                    self.diagnostics.push(GrammarDiagnostic::UnresolvedName(name.clone()));
                    vec![vec![]]
                }
            },
            Expr::Sequence(parts) => {
                let mut acc: Vec<Vec<Atom>> = vec![vec![]];
                for part in parts {
                    let part_alts = self.desugar(part);
                    let mut next = Vec::with_capacity(acc.len() * part_alts.len());
                    for prefix in &acc {
                        for suffix in &part_alts {
                            let mut combined = prefix.clone();
                            combined.extend(suffix.clone());
                            next.push(combined);
                        }
                    }
                    acc = next;
                }
                acc
            }
            Expr::Lookahead(inner) => match self.single_range_operand(inner) {
                Some(range) => vec![vec![Atom::terminal(range).assert()]],
                None => vec![vec![]],
            },
            Expr::LookaheadNot(inner) => match self.single_range_operand(inner) {
                Some(range) => {
                    let mut set = SymbolSet::from_range(self.full_terminal);
                    set.remove_range(range);
                    self.ranges_to_atoms(&set, true)
                }
                None => vec![vec![]],
            },
            Expr::Not(inner) => match self.single_range_operand(inner) {
                Some(range) => {
                    let mut set = SymbolSet::from_range(self.full_terminal);
                    set.remove_range(range);
                    self.ranges_to_atoms(&set, false)
                }
                None => vec![vec![]],
            },
            Expr::Optional(inner) => {
                let inner_alts = self.desugar(inner);
                let anon = self.alloc_anon();
                self.productions.push(Production::new(SymbolId(anon), vec![]));
                for alt in inner_alts {
                    self.productions.push(Production::new(SymbolId(anon), alt));
                }
                vec![vec![Atom::non_terminal(SymbolId(anon))]]
            }
            Expr::KleeneStar(inner) => {
                let inner_alts = self.desugar(inner);
                let anon = self.alloc_anon();
                self.productions.push(Production::new(SymbolId(anon), vec![]));
                for alt in inner_alts {
                    let mut atoms = alt;
                    atoms.push(Atom::non_terminal(SymbolId(anon)));
                    self.productions.push(Production::new(SymbolId(anon), atoms));
                }
                vec![vec![Atom::non_terminal(SymbolId(anon))]]
            }
            Expr::KleenePlus(inner) => {
                let star = Expr::KleeneStar(inner.clone());
                self.desugar(&Expr::Sequence(vec![(**inner).clone(), star]))
            }
        }
    }
}
