use std::fmt;
use std::sync::Arc;

use glyphon_symbols::{SymbolId, SymbolSet};
use glyphon_tables::ParseTable;

use crate::qualifier::Qualifier;
use crate::UsageError;

pub(crate) struct LprMeta {
    pub name: String,
    pub qualifier: Qualifier,
}

pub(crate) struct PprMeta {
    pub name: String,
}

pub(crate) struct GrammarData {
    pub lprs: Vec<LprMeta>,
    pub pprs: Vec<PprMeta>,
    pub lexical_table: ParseTable,
    pub syntactic_table: ParseTable,
}

/// An immutable, freely shareable, built grammar: the lexical (glyph
/// universe) and syntactic (token universe) parse tables plus the
/// rule metadata needed to name and qualify their non-terminals.
/// Cloning a `Grammar` is cheap — it is a reference-counted handle,
/// the same "build once, share read-only everywhere" shape
/// `original_source/taul/taul/grammar.cpp`'s `shared_ptr<grammar_data>`
/// gives the original.
#[derive(Clone)]
pub struct Grammar(Arc<GrammarData>);

impl Grammar {
    pub(crate) fn from_data(data: GrammarData) -> Self {
        Grammar(Arc::new(data))
    }

    pub fn lexical_table(&self) -> &ParseTable {
        &self.0.lexical_table
    }

    pub fn syntactic_table(&self) -> &ParseTable {
        &self.0.syntactic_table
    }

    pub fn lpr_count(&self) -> usize {
        self.0.lprs.len()
    }

    pub fn ppr_count(&self) -> usize {
        self.0.pprs.len()
    }

    pub fn lpr(&self, name: &str) -> Option<LprRef> {
        self.0
            .lprs
            .iter()
            .position(|r| r.name == name)
            .map(|index| LprRef { data: self.0.clone(), index: index as u32 })
    }

    pub fn ppr(&self, name: &str) -> Option<PprRef> {
        self.0
            .pprs
            .iter()
            .position(|r| r.name == name)
            .map(|index| PprRef { data: self.0.clone(), index: index as u32 })
    }

    pub fn lpr_at(&self, index: usize) -> Result<LprRef, UsageError> {
        if index < self.0.lprs.len() {
            Ok(LprRef { data: self.0.clone(), index: index as u32 })
        } else {
            Err(UsageError::OutOfRange { index, len: self.0.lprs.len() })
        }
    }

    pub fn ppr_at(&self, index: usize) -> Result<PprRef, UsageError> {
        if index < self.0.pprs.len() {
            Ok(PprRef { data: self.0.clone(), index: index as u32 })
        } else {
            Err(UsageError::OutOfRange { index, len: self.0.pprs.len() })
        }
    }

    pub fn lprs(&self) -> impl Iterator<Item = LprRef> + '_ {
        (0..self.0.lprs.len()).map(|i| LprRef { data: self.0.clone(), index: i as u32 })
    }

    pub fn pprs(&self) -> impl Iterator<Item = PprRef> + '_ {
        (0..self.0.pprs.len()).map(|i| PprRef { data: self.0.clone(), index: i as u32 })
    }

    /// Internal non-terminal boundaries for the glyph universe; not
    /// exposed in full because they're only meaningful alongside the
    /// tables they index into.
    pub(crate) fn data(&self) -> &GrammarData {
        &self.0
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grammar ({} lprs, {} pprs) {{", self.0.lprs.len(), self.0.pprs.len())?;
        for lpr in self.lprs() {
            writeln!(f, "\t{lpr}")?;
        }
        for ppr in self.pprs() {
            writeln!(f, "\t{ppr}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Grammar {
    /// The full dump used by debugging/tests: rules, then each
    /// table's FIRST/FOLLOW/PREFIX sets, matching the two-part
    /// `fmt()`/`fmt_internals()` split in the original source.
    pub fn fmt_internals(&self) -> String {
        format!("{}\n{}\n{}", self, self.0.lexical_table, self.0.syntactic_table)
    }
}

/// A cheap-to-copy handle onto one lexer production rule, bound to a
/// specific `Grammar`. Equality is identity (same grammar, same
/// index), not structural — two grammars that happen to declare an
/// identically-named rule still compare unequal.
#[derive(Clone)]
pub struct LprRef {
    data: Arc<GrammarData>,
    index: u32,
}

impl LprRef {
    pub fn name(&self) -> &str {
        &self.data.lprs[self.index as usize].name
    }

    pub fn qualifier(&self) -> Qualifier {
        self.data.lprs[self.index as usize].qualifier
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// This rule's ID in the glyph universe's non-terminal range.
    pub fn id(&self) -> SymbolId {
        SymbolId(self.data.lexical_table.traits().first_nonterminal.0 + self.index)
    }

    /// This rule's ID in the token universe's terminal range (lexer
    /// rules double as terminals when referenced from parser rules).
    pub fn token_id(&self) -> SymbolId {
        SymbolId(self.index)
    }

    pub fn first_set(&self) -> SymbolSet {
        self.data.lexical_table.first_set(self.id()).cloned().unwrap_or_default()
    }

    pub fn follow_set(&self) -> SymbolSet {
        self.data.lexical_table.follow_set(self.id()).cloned().unwrap_or_default()
    }

    pub fn prefix_set(&self) -> SymbolSet {
        self.data.lexical_table.prefix_set(self.id()).cloned().unwrap_or_default()
    }
}

impl PartialEq for LprRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.index == other.index
    }
}
impl Eq for LprRef {}

impl fmt::Display for LprRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}{}", self.index, self.name(), self.qualifier())
    }
}

impl fmt::Debug for LprRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A cheap-to-copy handle onto one parser production rule, bound to a
/// specific `Grammar`. Identity equality, as with `LprRef`.
#[derive(Clone)]
pub struct PprRef {
    data: Arc<GrammarData>,
    index: u32,
}

impl PprRef {
    pub fn name(&self) -> &str {
        &self.data.pprs[self.index as usize].name
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// This rule's ID in the token universe's non-terminal range.
    pub fn id(&self) -> SymbolId {
        SymbolId(self.data.syntactic_table.traits().first_nonterminal.0 + self.index)
    }

    pub fn first_set(&self) -> SymbolSet {
        self.data.syntactic_table.first_set(self.id()).cloned().unwrap_or_default()
    }

    pub fn follow_set(&self) -> SymbolSet {
        self.data.syntactic_table.follow_set(self.id()).cloned().unwrap_or_default()
    }

    pub fn prefix_set(&self) -> SymbolSet {
        self.data.syntactic_table.prefix_set(self.id()).cloned().unwrap_or_default()
    }
}

impl PartialEq for PprRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.index == other.index
    }
}
impl Eq for PprRef {}

impl fmt::Display for PprRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.name())
    }
}

impl fmt::Debug for PprRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
