//! Grammar data model and the translator that turns rule
//! declarations and bodies into a built, immutable `Grammar`.
//!
//! Grounded on `lapex-parser/src/grammar.rs` (the `Grammar`/`Symbol`
//! shape) and `lapex-parser/src/grammar_builder.rs`/`bnf.rs` (pattern
//! desugaring into anonymous non-terminals), generalized to two
//! symbol universes and enriched with the rule-qualifier and
//! identity-ref model from `original_source/taul/taul/grammar.cpp` and
//! `qualifier.cpp`.

mod base64;
mod expr;
mod grammar;
mod qualifier;
mod serialize;
mod translator;

pub use base64::{decode_base64, encode_base64};
pub use expr::Expr;
pub use grammar::{Grammar, LprRef, PprRef};
pub use qualifier::Qualifier;
pub use serialize::{DeserializeError, deserialize, serialize};
pub use translator::Translator;

/// Diagnostics raised while translating rule declarations and bodies
/// into a grammar. A translator that raised any of these never
/// produces a `Grammar` from `get_result()` — build-time diagnostics
/// are collected, not fail-fast, so every problem in a submission is
/// reported in one pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarDiagnostic {
    #[error("rule `{0}` is declared more than once")]
    DuplicateName(String),
    #[error("rule `{0}` has a body but was never declared")]
    UndeclaredRule(String),
    #[error("rule `{0}` has more than one body")]
    DuplicateDefinition(String),
    #[error("rule `{0}` was declared but never given a body")]
    MissingDefinition(String),
    #[error("reference to unknown rule `{0}`")]
    UnresolvedName(String),
    #[error("lookahead/not operand must desugar to exactly one terminal range")]
    InvalidLookaheadOperand,
    #[error("`failure` is not part of this universe's terminal set")]
    FailureNotInUniverse,
    #[error("`token(\"{0}\")` can only appear in a parser production rule's body")]
    TokenExpressionInLprBody(String),
    #[error("lexical table: {0}")]
    LexicalTable(glyphon_tables::TableDiagnostic),
    #[error("syntactic table: {0}")]
    SyntacticTable(glyphon_tables::TableDiagnostic),
}

/// Programmer-error conditions raised by misusing a built `Grammar`
/// (an index outside the declared rule count, and similar). These are
/// distinct from the build-time `GrammarDiagnostic`s and from the
/// data-encoded runtime recognition/parse errors the lexer and parser
/// produce — a `UsageError` means the caller, not the input, is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("index {index} out of range (grammar has {len} such rules)")]
    OutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests;
