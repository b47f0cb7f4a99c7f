use std::fmt;

use glyphon_symbols::SymbolId;

/// What kind of terminal a `Token` represents. Kept separate from
/// `Glyph`'s flat `SymbolId` because a token's identity (which LPR
/// matched) is meaningful independent of its universe-relative ID, and
/// because `failure`/`end` need to be distinguishable without a bound
/// grammar's `SymbolTraits` at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Matched the LPR whose token-universe terminal ID is given.
    Normal(SymbolId),
    Failure,
    End,
}

/// A single token-universe terminal: which LPR matched (or the
/// `failure`/`end` sentinels), its position, and its length, both in
/// the glyph stream's source code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
    pub len: usize,
}

impl Token {
    pub fn normal(lpr_token_id: SymbolId, pos: usize, len: usize) -> Self {
        Token { kind: TokenKind::Normal(lpr_token_id), pos, len }
    }

    pub fn failure(pos: usize, len: usize) -> Self {
        Token { kind: TokenKind::Failure, pos, len }
    }

    pub fn end(pos: usize) -> Self {
        Token { kind: TokenKind::End, pos, len: 0 }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.kind, TokenKind::Failure)
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::End)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Normal(id) => write!(f, "token({id})@{}..{}", self.pos, self.pos + self.len),
            TokenKind::Failure => write!(f, "failure@{}..{}", self.pos, self.pos + self.len),
            TokenKind::End => write!(f, "end@{}", self.pos),
        }
    }
}
