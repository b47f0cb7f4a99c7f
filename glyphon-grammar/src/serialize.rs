//! A bit-exact byte-buffer round-trip format for a built `Grammar`.
//!
//! Grounded on the original source's hand-rolled `buff`/`buff_reader`
//! serialization (`internal/grammar_data.h`'s `serialize`/`deserialize`
//! pair) rather than a general-purpose serialization crate, since the
//! spec calls for a specific wire layout (magic header, version, then
//! rule vectors and production lists) rather than an arbitrary
//! self-describing encoding. Only the grammar's source data (rule
//! names/qualifiers and the desugared productions) is stored; the
//! parse tables and FIRST/FOLLOW/PREFIX sets are pure functions of
//! that data; recomputing them on load costs nothing a grammar build
//! doesn't already pay and rules out any divergence between stored
//! and recomputed tables.

use glyphon_symbols::{SymbolId, SymbolRange, SymbolTraits};
use glyphon_tables::{Atom, AtomKind, Production};

use crate::grammar::{Grammar, GrammarData, LprMeta, PprMeta};
use crate::qualifier::Qualifier;

const MAGIC: [u8; 4] = *b"GLYF";
const VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeserializeError {
    #[error("not a glyphon grammar buffer (bad magic)")]
    BadMagic,
    #[error("buffer was written by format version {found}, this build reads version {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("buffer ended unexpectedly while reading a {0}")]
    Truncated(&'static str),
    #[error("buffer contained invalid UTF-8 in a rule name")]
    InvalidUtf8,
    #[error("buffer decoded to a grammar that fails table construction")]
    InvalidGrammar,
}

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        Writer { buf: Vec::new() }
    }
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }
    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn str(&mut self, s: &str) {
        self.u32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }
    fn u8(&mut self, what: &'static str) -> Result<u8, DeserializeError> {
        let b = *self.buf.get(self.pos).ok_or(DeserializeError::Truncated(what))?;
        self.pos += 1;
        Ok(b)
    }
    fn u32(&mut self, what: &'static str) -> Result<u32, DeserializeError> {
        let end = self.pos + 4;
        let slice = self.buf.get(self.pos..end).ok_or(DeserializeError::Truncated(what))?;
        self.pos = end;
        Ok(u32::from_le_bytes(slice.try_into().unwrap()))
    }
    fn str(&mut self) -> Result<String, DeserializeError> {
        let len = self.u32("string length")? as usize;
        let end = self.pos + len;
        let slice = self.buf.get(self.pos..end).ok_or(DeserializeError::Truncated("string bytes"))?;
        self.pos = end;
        String::from_utf8(slice.to_vec()).map_err(|_| DeserializeError::InvalidUtf8)
    }
}

fn write_productions(w: &mut Writer, productions: &[Production]) {
    w.u32(productions.len() as u32);
    for p in productions {
        w.u32(p.non_terminal.0);
        w.u32(p.atoms.len() as u32);
        for atom in &p.atoms {
            w.u8(atom.assertion as u8);
            match atom.kind {
                AtomKind::Terminal(range) => {
                    w.u8(0);
                    w.u32(range.lo.0);
                    w.u32(range.hi.0);
                }
                AtomKind::NonTerminal(id) => {
                    w.u8(1);
                    w.u32(id.0);
                }
            }
        }
    }
}

fn read_productions(r: &mut Reader) -> Result<Vec<Production>, DeserializeError> {
    let count = r.u32("production count")?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let non_terminal = SymbolId(r.u32("production non-terminal")?);
        let atom_count = r.u32("atom count")?;
        let mut atoms = Vec::with_capacity(atom_count as usize);
        for _ in 0..atom_count {
            let assertion = r.u8("assertion flag")? != 0;
            let tag = r.u8("atom tag")?;
            let kind = match tag {
                0 => {
                    let lo = SymbolId(r.u32("terminal lo")?);
                    let hi = SymbolId(r.u32("terminal hi")?);
                    AtomKind::Terminal(SymbolRange::new(lo, hi))
                }
                1 => AtomKind::NonTerminal(SymbolId(r.u32("non-terminal id")?)),
                _ => return Err(DeserializeError::Truncated("atom tag")),
            };
            atoms.push(Atom { kind, assertion });
        }
        out.push(Production::new(non_terminal, atoms));
    }
    Ok(out)
}

/// Encode a grammar's source data (rule metadata and desugared
/// productions) as a self-contained byte buffer.
pub fn serialize(grammar: &Grammar) -> Vec<u8> {
    let data = grammar.data();
    let mut w = Writer::new();
    w.buf.extend_from_slice(&MAGIC);
    w.u32(VERSION);

    w.u32(data.lprs.len() as u32);
    for lpr in &data.lprs {
        w.str(&lpr.name);
        w.u8(match lpr.qualifier {
            Qualifier::None => 0,
            Qualifier::Skip => 1,
            Qualifier::Support => 2,
        });
    }
    w.u32(data.pprs.len() as u32);
    for ppr in &data.pprs {
        w.str(&ppr.name);
    }

    let glyph_traits = data.lexical_table.traits();
    let token_traits = data.syntactic_table.traits();
    let glyph_total = glyph_traits.last_nonterminal.0 - glyph_traits.first_nonterminal.0 + 1;
    let token_total = token_traits.last_nonterminal.0 - token_traits.first_nonterminal.0 + 1;
    w.u32(glyph_total);
    w.u32(token_total);

    write_productions(&mut w, data.lexical_table.productions());
    write_productions(&mut w, data.syntactic_table.productions());

    w.buf
}

/// Decode a buffer produced by `serialize` back into a `Grammar`,
/// recomputing its parse tables from the stored productions.
pub fn deserialize(buf: &[u8]) -> Result<Grammar, DeserializeError> {
    let mut r = Reader::new(buf);
    let magic = r.buf.get(0..4).ok_or(DeserializeError::Truncated("magic"))?;
    if magic != MAGIC {
        return Err(DeserializeError::BadMagic);
    }
    r.pos = 4;
    let version = r.u32("version")?;
    if version != VERSION {
        return Err(DeserializeError::UnsupportedVersion { found: version, expected: VERSION });
    }

    let lpr_count = r.u32("lpr count")?;
    let mut lprs = Vec::with_capacity(lpr_count as usize);
    for _ in 0..lpr_count {
        let name = r.str()?;
        let qualifier = match r.u8("qualifier")? {
            0 => Qualifier::None,
            1 => Qualifier::Skip,
            2 => Qualifier::Support,
            _ => return Err(DeserializeError::InvalidGrammar),
        };
        lprs.push(LprMeta { name, qualifier });
    }
    let ppr_count = r.u32("ppr count")?;
    let mut pprs = Vec::with_capacity(ppr_count as usize);
    for _ in 0..ppr_count {
        pprs.push(PprMeta { name: r.str()? });
    }

    let glyph_total = r.u32("glyph non-terminal count")?;
    let token_total = r.u32("token non-terminal count")?;

    let glyph_productions = read_productions(&mut r)?;
    let syntactic_productions = read_productions(&mut r)?;

    let glyph_traits = SymbolTraits::glyph(glyph_total);
    let token_traits = SymbolTraits::token(lpr_count, token_total);

    let (lexical_table, lexical_diags) = glyphon_tables::build(glyph_traits, glyph_productions);
    let (syntactic_table, syntactic_diags) = glyphon_tables::build(token_traits, syntactic_productions);
    if !lexical_diags.is_empty() || !syntactic_diags.is_empty() {
        return Err(DeserializeError::InvalidGrammar);
    }

    Ok(Grammar::from_data(GrammarData { lprs, pprs, lexical_table, syntactic_table }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Expr, Translator};

    fn build_digit_grammar() -> Grammar {
        let mut t = Translator::new();
        t.add_lpr_decl("DIGIT", Qualifier::None);
        t.add_lpr("DIGIT", vec![Expr::Charset { ranges: vec![(b'0' as u32, b'9' as u32)], negated: false }]);
        t.add_ppr_decl("digit");
        t.add_ppr("digit", vec![Expr::Token("DIGIT".to_string())]);
        t.get_result().expect("grammar should build")
    }

    #[test]
    fn round_trips_a_small_grammar() {
        let grammar = build_digit_grammar();
        let bytes = serialize(&grammar);
        let restored = deserialize(&bytes).expect("round trip should succeed");
        assert_eq!(restored.lpr_count(), grammar.lpr_count());
        assert_eq!(restored.ppr_count(), grammar.ppr_count());
        assert_eq!(restored.lpr("DIGIT").unwrap().name(), "DIGIT");
        assert_eq!(restored.fmt_internals().len() > 0, true);
    }

    #[test]
    fn rejects_bad_magic() {
        let err = deserialize(&[0, 1, 2, 3]).unwrap_err();
        assert_eq!(err, DeserializeError::BadMagic);
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut bytes = serialize(&build_digit_grammar());
        bytes[4] = 0xFF;
        let err = deserialize(&bytes).unwrap_err();
        assert!(matches!(err, DeserializeError::UnsupportedVersion { .. }));
    }
}
