//! Re-exports the pieces that make up a grammar build and a parse run:
//! symbol model, ID grouper, parse tables, grammar translation,
//! symbol streams, the lexer, the parser and its error handlers, and
//! the parse tree. Mirrors `rehwinkel-lapex`'s own top-level `lapex`
//! crate's role as the facade over its sibling crates, minus the
//! CLI/codegen surface that crate also carries (out of scope here).

pub use glyphon_grammar::{decode_base64, deserialize, encode_base64, serialize, DeserializeError, Expr, Grammar, GrammarDiagnostic, LprRef, PprRef, Qualifier, Translator, UsageError};
pub use glyphon_grouper::IdGrouper;
pub use glyphon_lexer::{tokenize, tokenize_into, Lexer, Token, TokenKind, TokenizeOptions};
pub use glyphon_parser::{ErrorContext, ErrorHandler, NoRecoveryErrorHandler, NonterminalDecision, Parser, ParserOptions, ParserState, RegularErrorHandler, TerminalDecision};
pub use glyphon_streams::{Encoding, Glyph, GlyphReader, GlyphReaderOptions, RecordingObserver, SharedRecordingObserver, SymbolObserver, SymbolStream};
pub use glyphon_symbols::{SymbolId, SymbolRange, SymbolSet, SymbolTraits};
pub use glyphon_tables::{Atom, AtomKind, ParseTable, Production, TableDiagnostic};
pub use glyphon_tree::{Node, Pattern, PatternBuilder, PatternNode, Tree, TreeBuilder};
