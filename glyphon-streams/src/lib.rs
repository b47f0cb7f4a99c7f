//! Pull-based glyph and token streams.
//!
//! Grounded on the stream contract in spec §4.5/§6 (the teacher has no
//! stream abstraction of its own — `lapex-lexer`/`lapex-parser` consume
//! an in-memory `&str` directly) and on the observer pattern implied by
//! `original_source/tests/parameterized_tests/glyph_stream_tests.h`: a
//! stream is exercised purely through `peek`/`next`/`done`/`reset`, and
//! a single observer slot is notified of every symbol `next` yields.

mod glyph;
mod observer;
mod token;

pub use glyph::{Encoding, Glyph, GlyphReader, GlyphReaderOptions};
pub use observer::{RecordingObserver, SharedRecordingObserver, SymbolObserver};
pub use token::{Token, TokenKind};

/// The pull-based contract every glyph/token source implements.
///
/// `peek` is non-destructive: calling it any number of times with no
/// intervening `next`/`reset`/`change_input` returns the same symbol.
/// Once `done()` is true, `peek`/`next` keep returning the universe's
/// end-marker forever.
pub trait SymbolStream {
    type Symbol: Clone;

    fn peek(&mut self) -> Self::Symbol;
    fn next(&mut self) -> Self::Symbol;
    fn done(&self) -> bool;
    fn reset(&mut self);

    /// Current read position, in the stream's native units (source
    /// code units for a glyph stream, token count for a token stream).
    fn pos(&self) -> usize;
}
