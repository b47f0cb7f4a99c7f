//! Drives a grammar's lexical LL(1) table over a glyph stream,
//! emitting one token per invocation.
//!
//! Grounded on `rehwinkel-lapex`'s `lapex-lexer` crate for role (the
//! crate that turns characters into tokens) but re-targeted per spec
//! §9 "two-level recognizer as coupled state machines": instead of
//! building an NFA/DFA, each lexer production rule is tried as an
//! LL(1) derivation directly against the table `glyphon-tables` built,
//! using an explicit work stack rather than recursion (also per §9).
//! Failure-token coalescing and qualifier handling follow
//! `original_source/tests/tokenize_tests.cpp`'s `tokenize`/`tokenize_into`
//! semantics.

use glyphon_grammar::{Grammar, Qualifier};
use glyphon_streams::{Encoding, Glyph, GlyphReader, GlyphReaderOptions, SymbolObserver, SymbolStream};
use glyphon_symbols::SymbolId;
use glyphon_tables::{Atom, AtomKind, ParseTable};

pub use glyphon_streams::{Token, TokenKind};

/// Configuration recognized when tokenizing (spec §6 *Tokenize*
/// options).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// When true, `skip`-qualified tokens are retained in the stream
    /// instead of being filtered out.
    pub include_skips: bool,
    pub start_offset: usize,
    pub encoding: Encoding,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        TokenizeOptions { include_skips: false, start_offset: 0, encoding: Encoding::Utf8 }
    }
}

/// Attempts to derive `start_nt` against `glyphs` beginning at index
/// `start`, using an explicit stack of atoms rather than recursion.
/// Returns the resulting glyph index on success.
fn attempt(table: &ParseTable, start_nt: SymbolId, glyphs: &[Glyph], end_symbol: SymbolId, start: usize) -> Option<usize> {
    let mut stack: Vec<Atom> = vec![Atom::non_terminal(start_nt)];
    let mut index = start;
    while let Some(atom) = stack.pop() {
        let lookahead = glyphs.get(index).map(|g| g.symbol).unwrap_or(end_symbol);
        match atom.kind {
            AtomKind::NonTerminal(nt) => {
                let production_index = table.get_production(nt, lookahead)?;
                let production = table.production(production_index);
                for a in production.atoms.iter().rev() {
                    stack.push(a.clone());
                }
            }
            AtomKind::Terminal(range) => {
                if range.contains(lookahead) {
                    if !atom.assertion {
                        index += 1;
                    }
                } else {
                    return None;
                }
            }
        }
    }
    Some(index)
}

/// A lexer is itself a token stream: it drives the grammar's lexical
/// table over a glyph stream, one token per `next()` call.
pub struct Lexer {
    grammar: Grammar,
    reader: GlyphReader,
    options: TokenizeOptions,
    finished: bool,
    pending: Option<Token>,
    observer: Option<Box<dyn SymbolObserver<Token>>>,
}

impl Lexer {
    pub fn new(grammar: Grammar, bytes: &[u8], options: TokenizeOptions) -> Self {
        let reader_options = GlyphReaderOptions { encoding: options.encoding, start_offset: options.start_offset };
        Lexer {
            grammar,
            reader: GlyphReader::new(bytes, reader_options),
            options,
            finished: false,
            pending: None,
            observer: None,
        }
    }

    pub fn bind_observer(&mut self, observer: Box<dyn SymbolObserver<Token>>) {
        self.observer = Some(observer);
    }

    fn table(&self) -> &ParseTable {
        self.grammar.lexical_table()
    }

    fn end_symbol(&self) -> SymbolId {
        self.table().traits().end
    }

    fn matches_any(&self, index: usize) -> bool {
        let glyphs = self.reader.glyphs();
        let end = self.end_symbol();
        self.grammar
            .lprs()
            .filter(|lpr| lpr.qualifier() != Qualifier::Support)
            .any(|lpr| attempt(self.table(), lpr.id(), glyphs, end, index).is_some())
    }

    fn best_match(&self, index: usize) -> Option<(SymbolId, Qualifier, usize)> {
        let glyphs = self.reader.glyphs();
        let end = self.end_symbol();
        for lpr in self.grammar.lprs().filter(|lpr| lpr.qualifier() != Qualifier::Support) {
            if let Some(new_index) = attempt(self.table(), lpr.id(), glyphs, end, index) {
                return Some((lpr.token_id(), lpr.qualifier(), new_index));
            }
        }
        None
    }

    /// Scan one token at the current position, advancing the reader
    /// past it. Skip-qualified matches loop internally when
    /// `include_skips` is false, so the returned token is always what
    /// the stream should actually yield.
    fn scan(&mut self) -> Token {
        loop {
            if self.reader.done() {
                self.finished = true;
                return Token::end(self.reader.end_pos());
            }
            let start = self.reader.cursor();
            let start_pos = self.reader.pos_at(start);
            if let Some((token_id, qualifier, end_index)) = self.best_match(start) {
                self.reader.seek(end_index);
                let end_pos = self.reader.pos_at(end_index);
                let token = Token::normal(token_id, start_pos, end_pos - start_pos);
                if qualifier == Qualifier::Skip && !self.options.include_skips {
                    continue;
                }
                return token;
            }
            // nothing matched: coalesce this and every subsequent
            // unrecognized glyph into one failure token.
            self.reader.seek(start + 1);
            while !self.reader.done() && !self.matches_any(self.reader.cursor()) {
                self.reader.seek(self.reader.cursor() + 1);
            }
            let end_pos = self.reader.pos_at(self.reader.cursor());
            return Token::failure(start_pos, end_pos - start_pos);
        }
    }
}

impl SymbolStream for Lexer {
    type Symbol = Token;

    fn peek(&mut self) -> Token {
        if self.pending.is_none() {
            self.pending = Some(self.scan());
        }
        self.pending.unwrap()
    }

    fn next(&mut self) -> Token {
        let token = self.peek();
        self.pending = None;
        if let Some(obs) = self.observer.as_mut() {
            obs.observe(&token);
        }
        token
    }

    fn done(&self) -> bool {
        self.finished
    }

    fn reset(&mut self) {
        self.reader.reset();
        self.finished = false;
        self.pending = None;
    }

    fn pos(&self) -> usize {
        self.reader.pos()
    }
}

/// Tokenizes `bytes` against `grammar` from the start, returning every
/// token including the trailing `end`. Mirrors
/// `original_source/tests/tokenize_tests.cpp`'s `tokenize` free
/// function, generalized from a single hand-written lexer function to
/// a grammar-driven one.
pub fn tokenize(grammar: &Grammar, bytes: &[u8], options: TokenizeOptions) -> Vec<Token> {
    let mut tokens = Vec::new();
    tokenize_into(&mut tokens, grammar, bytes, options);
    tokens
}

/// Appends to `tokens` instead of returning a fresh vector, mirroring
/// `tokenize_into`'s accumulator style in the same source file.
pub fn tokenize_into(tokens: &mut Vec<Token>, grammar: &Grammar, bytes: &[u8], options: TokenizeOptions) {
    let mut lexer = Lexer::new(grammar.clone(), bytes, options);
    loop {
        let token = lexer.next();
        let is_end = token.is_end();
        tokens.push(token);
        if is_end {
            break;
        }
    }
}
