//! Drives a grammar's syntactic LL(1) table over a token stream,
//! producing a parse tree and, on a parse error, handing control to a
//! pluggable error handler.
//!
//! Generalizes `glyphon-lexer`'s explicit-stack `attempt()` driver:
//! the lexer only needed a boolean success/failure per trial, this
//! driver additionally emits tree-builder events and can recover from
//! a mismatch instead of simply failing. Error-handler shape and the
//! two concrete handlers are grounded on
//! `original_source/tests/parameterized_tests/error_handler_tests.h`
//! (the shared `A/B/C/GAP`, `ABC`, `ABCABC` test grammar and the
//! `no_recovery_error_handler`/`regular_error_handler` names).

mod handler;

pub use handler::{ErrorContext, ErrorHandler, NoRecoveryErrorHandler, NonterminalDecision, RegularErrorHandler, TerminalDecision};

use std::collections::VecDeque;

use glyphon_grammar::{Grammar, PprRef};
use glyphon_streams::{SymbolStream, Token, TokenKind};
use glyphon_symbols::{SymbolId, SymbolRange, SymbolTraits};
use glyphon_tables::{Atom, AtomKind};
use glyphon_tree::{Tree, TreeBuilder};

/// Lifecycle of a `Parser`, spec-mandated: a fresh parser is `Idle`,
/// becomes `Running` once `parse` starts, and ends either `Succeeded`
/// or `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    Running,
    Succeeded,
    Aborted,
}

/// Parser-wide configuration. With no error handler, any mismatch
/// aborts immediately (equivalent to using `NoRecoveryErrorHandler`
/// but without constructing one).
#[derive(Default)]
pub struct ParserOptions {
    pub error_handler: Option<Box<dyn ErrorHandler>>,
}

/// Buffers exactly as many upcoming symbols as callers have peeked,
/// giving one-token lookahead past whatever a driver is currently
/// considering without requiring the underlying stream to support
/// pushback. Built on `next()` alone so it works with any
/// `SymbolStream` impl, including ones whose own `peek()` only covers
/// the immediate next symbol.
struct Lookahead<S: SymbolStream> {
    inner: S,
    buf: VecDeque<S::Symbol>,
}

impl<S: SymbolStream> Lookahead<S>
where
    S::Symbol: Copy,
{
    fn new(inner: S) -> Self {
        Lookahead { inner, buf: VecDeque::new() }
    }

    fn peek_at(&mut self, k: usize) -> S::Symbol {
        while self.buf.len() <= k {
            let v = self.inner.next();
            self.buf.push_back(v);
        }
        self.buf[k]
    }

    fn peek(&mut self) -> S::Symbol {
        self.peek_at(0)
    }

    fn next(&mut self) -> S::Symbol {
        match self.buf.pop_front() {
            Some(v) => v,
            None => self.inner.next(),
        }
    }
}

fn token_symbol(traits: &SymbolTraits, tok: Token) -> SymbolId {
    match tok.kind {
        TokenKind::Normal(id) => id,
        TokenKind::Failure => traits.failure.expect("token universe always carries a failure terminal"),
        TokenKind::End => traits.end,
    }
}

fn named_ppr(grammar: &Grammar, nt: SymbolId) -> Option<PprRef> {
    let traits = grammar.syntactic_table().traits();
    let ppr_count = grammar.ppr_count() as u32;
    if nt.0 >= traits.first_nonterminal.0 && nt.0 < traits.first_nonterminal.0 + ppr_count {
        grammar.ppr_at((nt.0 - traits.first_nonterminal.0) as usize).ok()
    } else {
        None
    }
}

fn emit_leaf(builder: &mut TreeBuilder, grammar: &Grammar, tok: Token) {
    match tok.kind {
        TokenKind::Normal(id) => {
            let lpr = grammar.lpr_at(id.0 as usize).expect("token id names a declared lpr");
            builder.lexical(lpr, tok.pos, tok.len);
        }
        TokenKind::Failure => {
            builder.failure(tok.pos, tok.len);
        }
        TokenKind::End => {
            builder.end(tok.pos);
        }
    }
}

/// Synthesizes a zero-length leaf for a terminal the handler chose to
/// insert rather than skip past. `range` is always a singleton for
/// every terminal atom a PPR body can desugar into, so its low end
/// names exactly which terminal to synthesize.
fn emit_synthetic(builder: &mut TreeBuilder, grammar: &Grammar, range: SymbolRange, pos: usize) {
    let traits = grammar.syntactic_table().traits();
    let id = range.lo;
    if traits.is_end(id) {
        builder.end(pos);
    } else if traits.is_failure(id) {
        builder.failure(pos, 0);
    } else if let Ok(lpr) = grammar.lpr_at(id.0 as usize) {
        builder.lexical(lpr, pos, 0);
    }
}

/// Closes the node that held the failing atom, then attaches `abort`
/// to whatever is now the innermost open node — its parent, unless
/// the failing node was the root, in which case `abort` lands inside
/// it directly. `Parser::parse`'s final `builder.finish()` closes
/// whatever remains open after this.
fn do_abort(builder: &mut TreeBuilder) {
    if builder.depth() > 1 {
        builder.close();
        builder.abort();
    } else {
        builder.abort();
    }
}

enum Work {
    Atom(Atom),
    Close,
}

/// A stateful LL(1) syntactic parser. Reusable across multiple
/// `parse` calls; each call resets the state machine to `Running`.
pub struct Parser {
    state: ParserState,
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser { state: ParserState::Idle }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Parses `start`'s rule out of `tokens`, returning the resulting
    /// tree (partial, if aborted) and leaving `state()` queryable for
    /// the outcome. Returns `None` only if `start` does not name a
    /// declared rule.
    pub fn parse<S>(&mut self, grammar: &Grammar, start: &str, tokens: S, mut options: ParserOptions) -> Option<Tree>
    where
        S: SymbolStream<Symbol = Token>,
    {
        let start_ppr = grammar.ppr(start)?;
        self.state = ParserState::Running;
        if let Some(h) = options.error_handler.as_mut() {
            h.startup();
        }

        let table = grammar.syntactic_table();
        let traits = *table.traits();
        let mut lookahead = Lookahead::new(tokens);
        let mut builder = TreeBuilder::new();

        let start_pos = lookahead.peek().pos;
        builder.syntactic(start_ppr.clone(), start_pos);
        let mut stack = vec![Work::Close, Work::Atom(Atom::non_terminal(start_ppr.id()))];
        let mut current_nt = start_ppr.id();
        let mut aborted = false;

        while let Some(item) = stack.pop() {
            match item {
                Work::Close => {
                    builder.close();
                }
                Work::Atom(atom) => match atom.kind {
                    AtomKind::NonTerminal(nt) => {
                        let tok = lookahead.peek();
                        let id = token_symbol(&traits, tok);
                        match table.get_production(nt, id) {
                            Some(idx) => {
                                current_nt = nt;
                                if let Some(ppr) = named_ppr(grammar, nt) {
                                    builder.syntactic(ppr, tok.pos);
                                    stack.push(Work::Close);
                                }
                                for a in table.production(idx).atoms.iter().rev() {
                                    stack.push(Work::Atom(a.clone()));
                                }
                            }
                            None => {
                                let ctx = ErrorContext {
                                    current_nonterminal: current_nt,
                                    offending: tok,
                                    lookahead_after_offending: lookahead.peek_at(1),
                                };
                                let decision = match options.error_handler.as_mut() {
                                    Some(h) => h.nonterminal_error(nt, &ctx),
                                    None => NonterminalDecision::Abort,
                                };
                                match decision {
                                    NonterminalDecision::Abort => {
                                        aborted = true;
                                        break;
                                    }
                                    NonterminalDecision::Skip => {
                                        builder.skip(tok.len);
                                        lookahead.next();
                                        stack.push(Work::Atom(Atom::non_terminal(nt)));
                                    }
                                }
                            }
                        }
                    }
                    AtomKind::Terminal(range) => {
                        let tok = lookahead.peek();
                        let id = token_symbol(&traits, tok);
                        if range.contains(id) {
                            if !atom.assertion {
                                lookahead.next();
                                emit_leaf(&mut builder, grammar, tok);
                            }
                        } else {
                            let ctx = ErrorContext {
                                current_nonterminal: current_nt,
                                offending: tok,
                                lookahead_after_offending: lookahead.peek_at(1),
                            };
                            let decision = match options.error_handler.as_mut() {
                                Some(h) => h.terminal_error(range, &ctx),
                                None => TerminalDecision::Abort,
                            };
                            match decision {
                                TerminalDecision::Abort => {
                                    aborted = true;
                                    break;
                                }
                                TerminalDecision::Skip => {
                                    builder.skip(tok.len);
                                    lookahead.next();
                                    stack.push(Work::Atom(atom));
                                }
                                TerminalDecision::InsertMissing => {
                                    emit_synthetic(&mut builder, grammar, range, tok.pos);
                                }
                            }
                        }
                    }
                },
            }
        }

        if aborted {
            do_abort(&mut builder);
            self.state = ParserState::Aborted;
        } else {
            self.state = ParserState::Succeeded;
        }
        if let Some(h) = options.error_handler.as_mut() {
            h.shutdown();
        }
        Some(builder.finish())
    }
}

#[cfg(test)]
mod tests;
