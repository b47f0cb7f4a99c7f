use glyphon_grammar::Grammar;
use glyphon_streams::Token;
use glyphon_symbols::{SymbolId, SymbolRange};

/// What the driver was doing and what it saw when a mismatch was
/// detected: which non-terminal's production is currently open (for
/// FOLLOW lookups), the token that failed to match, and the token
/// after it (for deciding whether skipping the offending token would
/// actually let the parse continue).
pub struct ErrorContext {
    pub current_nonterminal: SymbolId,
    pub offending: Token,
    pub lookahead_after_offending: Token,
}

/// What to do about a terminal atom that didn't match the lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalDecision {
    /// Give up on the parse entirely.
    Abort,
    /// Treat the offending token as noise: attach it as a `skip` leaf
    /// and retry the same terminal against what follows.
    Skip,
    /// Leave the offending token alone and synthesize a zero-length
    /// leaf for the terminal that was expected.
    InsertMissing,
}

/// What to do about a non-terminal whose production table has no
/// entry for the lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonterminalDecision {
    Abort,
    Skip,
}

/// Reacts to parse errors. Handlers are constructed with the grammar
/// they'll run against so they can consult its FIRST/FOLLOW/PREFIX
/// sets directly, mirroring `error_handler_tests.h`'s
/// `factory(grammar, logger)` construction.
pub trait ErrorHandler {
    fn startup(&mut self) {}
    fn shutdown(&mut self) {}
    fn terminal_error(&mut self, expected: SymbolRange, ctx: &ErrorContext) -> TerminalDecision;
    fn nonterminal_error(&mut self, expected_non_terminal: SymbolId, ctx: &ErrorContext) -> NonterminalDecision;
}

/// Aborts on the very first error. Grounded on
/// `original_source/tests/no_recovery_error_handler_tests.cpp`.
#[derive(Default)]
pub struct NoRecoveryErrorHandler;

impl NoRecoveryErrorHandler {
    pub fn new() -> Self {
        NoRecoveryErrorHandler
    }
}

impl ErrorHandler for NoRecoveryErrorHandler {
    fn terminal_error(&mut self, _expected: SymbolRange, _ctx: &ErrorContext) -> TerminalDecision {
        TerminalDecision::Abort
    }

    fn nonterminal_error(&mut self, _expected_non_terminal: SymbolId, _ctx: &ErrorContext) -> NonterminalDecision {
        NonterminalDecision::Abort
    }
}

/// Single-token panic-mode recovery: skips the offending token exactly
/// once if doing so is plausible (the token after it would satisfy
/// what was expected, or would at least be valid at this point in the
/// enclosing production), otherwise aborts like
/// `NoRecoveryErrorHandler`. Grounded on
/// `original_source/tests/regular_error_handler_tests.cpp`.
pub struct RegularErrorHandler {
    grammar: Grammar,
}

impl RegularErrorHandler {
    pub fn new(grammar: Grammar) -> Self {
        RegularErrorHandler { grammar }
    }

    fn lookahead_id(&self, tok: Token) -> SymbolId {
        crate::token_symbol(self.grammar.syntactic_table().traits(), tok)
    }
}

impl ErrorHandler for RegularErrorHandler {
    fn terminal_error(&mut self, expected: SymbolRange, ctx: &ErrorContext) -> TerminalDecision {
        let after = self.lookahead_id(ctx.lookahead_after_offending);
        if expected.contains(after) {
            return TerminalDecision::Skip;
        }
        let table = self.grammar.syntactic_table();
        if let Some(follow) = table.follow_set(ctx.current_nonterminal) {
            if follow.includes(after) {
                return TerminalDecision::Skip;
            }
        }
        TerminalDecision::Abort
    }

    fn nonterminal_error(&mut self, expected_non_terminal: SymbolId, ctx: &ErrorContext) -> NonterminalDecision {
        let after = self.lookahead_id(ctx.lookahead_after_offending);
        let table = self.grammar.syntactic_table();
        if let Some(prefix) = table.prefix_set(expected_non_terminal) {
            if prefix.includes(after) {
                return NonterminalDecision::Skip;
            }
        }
        if let Some(follow) = table.follow_set(ctx.current_nonterminal) {
            if follow.includes(after) {
                return NonterminalDecision::Skip;
            }
        }
        NonterminalDecision::Abort
    }
}
