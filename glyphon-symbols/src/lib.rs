//! The symbol model shared by the glyph and token universes.
//!
//! A grammar's symbols live in one of two "universes": the glyph
//! universe (Unicode code points plus an `end` terminal, with lexer
//! production rules as non-terminals) or the token universe (lexer
//! production rule indices plus `end`/`failure` terminals, with parser
//! production rule indices as non-terminals). Rather than monomorphize
//! every downstream crate over a marker type, the boundary IDs of
//! whichever universe is in play are carried around as a plain value
//! (`SymbolTraits`), built once per grammar compile and threaded
//! through the symbol set, ID grouper and parse-table builder.

mod set;

pub use set::SymbolSet;

use std::fmt;

/// A dense identifier inside a symbol universe. Terminals and
/// non-terminals share one ID space per universe; `SymbolTraits`
/// tells you where one ends and the other begins.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const fn new(id: u32) -> Self {
        SymbolId(id)
    }

    pub fn checked_prev(self) -> Option<SymbolId> {
        self.0.checked_sub(1).map(SymbolId)
    }

    pub fn checked_next(self) -> Option<SymbolId> {
        self.0.checked_add(1).map(SymbolId)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SymbolId {
    fn from(value: u32) -> Self {
        SymbolId(value)
    }
}

/// An inclusive range of symbol IDs, `lo <= hi`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolRange {
    pub lo: SymbolId,
    pub hi: SymbolId,
}

impl SymbolRange {
    pub fn new(a: SymbolId, b: SymbolId) -> Self {
        if a <= b {
            SymbolRange { lo: a, hi: b }
        } else {
            SymbolRange { lo: b, hi: a }
        }
    }

    pub fn single(id: SymbolId) -> Self {
        SymbolRange { lo: id, hi: id }
    }

    pub fn len(&self) -> u64 {
        self.hi.0 as u64 - self.lo.0 as u64 + 1
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.lo <= id && id <= self.hi
    }

    pub fn overlaps(&self, other: &SymbolRange) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }

    /// True when the two ranges overlap or touch, i.e. could be
    /// coalesced into one contiguous range.
    pub fn adjacent_or_overlaps(&self, other: &SymbolRange) -> bool {
        self.overlaps(other)
            || self.hi.checked_next() == Some(other.lo)
            || other.hi.checked_next() == Some(self.lo)
    }
}

/// The boundary IDs of one symbol universe, computed once per grammar
/// build. Both universes share this shape; the glyph universe's
/// terminal range is a compile-time constant (all of Unicode plus
/// `end`), the token universe's depends on how many lexer rules the
/// grammar declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolTraits {
    pub first_terminal: SymbolId,
    pub last_terminal: SymbolId,
    pub end: SymbolId,
    pub failure: Option<SymbolId>,
    pub first_nonterminal: SymbolId,
    pub last_nonterminal: SymbolId,
}

/// Last Unicode scalar value plus one, used as the glyph universe's
/// terminal bound (glyph IDs are raw code points, `0..=0x10FFFF`).
pub const MAX_GLYPH: u32 = 0x10FFFF;

impl SymbolTraits {
    /// The glyph universe: terminals are Unicode code points, `end`
    /// immediately follows the last code point, and non-terminals are
    /// lexer production rule indices (named LPRs plus whatever
    /// anonymous non-terminals their bodies desugar into —
    /// `nonterminal_count` is that total, not just the named count).
    pub fn glyph(nonterminal_count: u32) -> Self {
        let end = SymbolId(MAX_GLYPH + 1);
        let first_nonterminal = SymbolId(end.0 + 1);
        let last_nonterminal = SymbolId(first_nonterminal.0 + nonterminal_count.saturating_sub(1));
        SymbolTraits {
            first_terminal: SymbolId(0),
            last_terminal: SymbolId(MAX_GLYPH),
            end,
            failure: None,
            first_nonterminal,
            last_nonterminal,
        }
    }

    /// The token universe: terminals are lexer production rule
    /// indices plus `end` and `failure`, non-terminals are parser
    /// production rule indices (named PPRs plus anonymous ones;
    /// `nonterminal_count` is that total).
    pub fn token(lpr_count: u32, nonterminal_count: u32) -> Self {
        let last_terminal = SymbolId(lpr_count.saturating_sub(1));
        let end = SymbolId(lpr_count);
        let failure = SymbolId(lpr_count + 1);
        let first_nonterminal = SymbolId(lpr_count + 2);
        let last_nonterminal = SymbolId(first_nonterminal.0 + nonterminal_count.saturating_sub(1));
        SymbolTraits {
            first_terminal: SymbolId(0),
            last_terminal,
            end,
            failure: Some(failure),
            first_nonterminal,
            last_nonterminal,
        }
    }

    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.first_terminal <= id && id <= self.last_terminal
    }

    pub fn is_nonterminal(&self, id: SymbolId) -> bool {
        self.first_nonterminal <= id && id <= self.last_nonterminal
    }

    pub fn is_end(&self, id: SymbolId) -> bool {
        id == self.end
    }

    pub fn is_failure(&self, id: SymbolId) -> bool {
        self.failure == Some(id)
    }

    /// Every terminal ID, as a single inclusive range.
    pub fn terminal_range(&self) -> SymbolRange {
        SymbolRange::new(self.first_terminal, self.last_terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_universe_bounds() {
        let t = SymbolTraits::glyph(3);
        assert_eq!(t.first_terminal, SymbolId(0));
        assert_eq!(t.last_terminal, SymbolId(MAX_GLYPH));
        assert_eq!(t.end, SymbolId(MAX_GLYPH + 1));
        assert_eq!(t.failure, None);
        assert_eq!(t.first_nonterminal, SymbolId(MAX_GLYPH + 2));
        assert_eq!(t.last_nonterminal, SymbolId(MAX_GLYPH + 4));
        assert!(t.is_nonterminal(SymbolId(MAX_GLYPH + 3)));
        assert!(!t.is_terminal(t.end));
    }

    #[test]
    fn token_universe_bounds() {
        let t = SymbolTraits::token(4, 7);
        assert_eq!(t.first_terminal, SymbolId(0));
        assert_eq!(t.last_terminal, SymbolId(3));
        assert_eq!(t.end, SymbolId(4));
        assert_eq!(t.failure, Some(SymbolId(5)));
        assert_eq!(t.first_nonterminal, SymbolId(6));
        assert_eq!(t.last_nonterminal, SymbolId(12));
    }

    #[test]
    fn range_adjacency() {
        let a = SymbolRange::new(SymbolId(0), SymbolId(5));
        let b = SymbolRange::new(SymbolId(6), SymbolId(9));
        let c = SymbolRange::new(SymbolId(20), SymbolId(30));
        assert!(a.adjacent_or_overlaps(&b));
        assert!(!a.adjacent_or_overlaps(&c));
    }
}
