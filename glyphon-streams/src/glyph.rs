use std::fmt;

use glyphon_symbols::{SymbolId, MAX_GLYPH};

use crate::observer::SymbolObserver;
use crate::SymbolStream;

/// A single lexer-universe terminal: a code point (or the `end`
/// sentinel) plus its position in source code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub symbol: SymbolId,
    pub pos: usize,
}

impl Glyph {
    pub fn end(pos: usize) -> Self {
        Glyph { symbol: SymbolId(MAX_GLYPH + 1), pos }
    }

    pub fn is_end(&self) -> bool {
        self.symbol.0 == MAX_GLYPH + 1
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end() {
            write!(f, "end@{}", self.pos)
        } else {
            match char::from_u32(self.symbol.0) {
                Some(c) => write!(f, "{c:?}@{}", self.pos),
                None => write!(f, "<{:#x}>@{}", self.symbol.0, self.pos),
            }
        }
    }
}

/// The encodings a `GlyphReader` can decode source bytes with. Decoding
/// itself uses the standard library's Unicode routines (`str`'s UTF-8
/// validation, `char::decode_utf16`, `char::from_u32`) — no
/// hand-rolled decoder, since encoding-conversion utilities are an
/// explicit out-of-scope "external collaborator" (spec §1); this
/// reader's job is only to hand code points and positions to the
/// stream contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16,
    Utf32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphReaderOptions {
    pub encoding: Encoding,
    pub start_offset: usize,
}

/// A string-backed glyph stream with a configurable encoding decoder.
/// The source is decoded eagerly into a position-tagged glyph list at
/// construction time (there is no I/O inside the core, spec §5 — the
/// whole source is already an in-memory buffer), so `peek`/`next` are
/// plain index bumps.
pub struct GlyphReader {
    glyphs: Vec<Glyph>,
    end_pos: usize,
    options: GlyphReaderOptions,
    cursor: usize,
    observer: Option<Box<dyn SymbolObserver<Glyph>>>,
}

impl GlyphReader {
    pub fn new(bytes: &[u8], options: GlyphReaderOptions) -> Self {
        let (glyphs, end_pos) = decode(bytes, options.encoding);
        let start = glyphs.partition_point(|g| g.pos < options.start_offset);
        GlyphReader {
            glyphs,
            end_pos,
            options,
            cursor: start,
            observer: None,
        }
    }

    pub fn bind_observer(&mut self, observer: Box<dyn SymbolObserver<Glyph>>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Rebind to a new source. The caller must call `reset()` before
    /// reading again, matching spec §4.5's `change_input` contract.
    pub fn change_input(&mut self, bytes: &[u8], options: GlyphReaderOptions) {
        let (glyphs, end_pos) = decode(bytes, options.encoding);
        self.glyphs = glyphs;
        self.end_pos = end_pos;
        self.options = options;
        self.cursor = usize::MAX; // force an explicit reset before use
    }

    /// The fully decoded glyph sequence, for consumers (the lexer) that
    /// index into it directly instead of driving through `peek`/`next`.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn end_pos(&self) -> usize {
        self.end_pos
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn seek(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.glyphs.len());
    }

    /// Source position a given glyph index would read from, including
    /// one past the end (`end_pos`).
    pub fn pos_at(&self, cursor: usize) -> usize {
        self.glyphs.get(cursor).map(|g| g.pos).unwrap_or(self.end_pos)
    }

    fn current(&self) -> Glyph {
        match self.glyphs.get(self.cursor) {
            Some(g) => *g,
            None => Glyph::end(self.end_pos),
        }
    }
}

impl SymbolStream for GlyphReader {
    type Symbol = Glyph;

    fn peek(&mut self) -> Glyph {
        self.current()
    }

    fn next(&mut self) -> Glyph {
        let g = self.current();
        if self.cursor < self.glyphs.len() {
            self.cursor += 1;
        }
        if let Some(obs) = self.observer.as_mut() {
            obs.observe(&g);
        }
        g
    }

    fn done(&self) -> bool {
        self.cursor >= self.glyphs.len()
    }

    fn reset(&mut self) {
        self.cursor = self.glyphs.partition_point(|g| g.pos < self.options.start_offset);
    }

    fn pos(&self) -> usize {
        self.current().pos
    }
}

fn decode(bytes: &[u8], encoding: Encoding) -> (Vec<Glyph>, usize) {
    match encoding {
        Encoding::Utf8 => {
            let text = std::str::from_utf8(bytes).unwrap_or("");
            let glyphs = text.char_indices().map(|(pos, c)| Glyph { symbol: SymbolId(c as u32), pos }).collect();
            (glyphs, bytes.len())
        }
        Encoding::Utf16 => {
            let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
            let mut glyphs = Vec::new();
            let mut pos = 0usize;
            for c in char::decode_utf16(units.iter().copied()) {
                let c = c.unwrap_or(char::REPLACEMENT_CHARACTER);
                let width = c.len_utf16();
                glyphs.push(Glyph { symbol: SymbolId(c as u32), pos });
                pos += width;
            }
            (glyphs, units.len())
        }
        Encoding::Utf32 => {
            let units: Vec<u32> = bytes.chunks_exact(4).map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect();
            let glyphs = units
                .iter()
                .enumerate()
                .map(|(i, &cp)| Glyph { symbol: SymbolId(char::from_u32(cp).map(|c| c as u32).unwrap_or(cp)), pos: i })
                .collect();
            (glyphs, units.len())
        }
    }
}
