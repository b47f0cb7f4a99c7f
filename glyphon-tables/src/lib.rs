//! FIRST/FOLLOW/PREFIX set computation and LL(1) parse-table
//! construction, generalized over a symbol universe's boundary IDs
//! (`glyphon_symbols::SymbolTraits`) so the same builder drives both
//! the lexical table (glyph universe) and the syntactic table (token
//! universe).
//!
//! Grounded on `lapex-parser/src/util.rs` (`compute_first_sets`,
//! `get_first_terminals_of_sequence`) and
//! `lapex-parser/src/ll_parser/mod.rs` (`compute_follow_sets`,
//! `generate_table`, the table-conflict-as-error design), generalized
//! from the teacher's single hardcoded `Symbol` enum to atoms that can
//! carry a terminal *range* (not just one terminal) and an assertion
//! flag for lookahead atoms.

use std::collections::BTreeMap;

use glyphon_grouper::{GroupId, IdGrouper};
use glyphon_symbols::{SymbolId, SymbolRange, SymbolSet, SymbolTraits};

/// One element of a production's right-hand side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Atom {
    pub kind: AtomKind,
    /// An assertion atom is matched (as a lookahead condition) but
    /// never consumes input; scanning for FIRST/FOLLOW purposes
    /// continues past it regardless of its own nullability.
    pub assertion: bool,
}

impl Atom {
    pub fn terminal(range: SymbolRange) -> Self {
        Atom {
            kind: AtomKind::Terminal(range),
            assertion: false,
        }
    }

    pub fn non_terminal(id: SymbolId) -> Self {
        Atom {
            kind: AtomKind::NonTerminal(id),
            assertion: false,
        }
    }

    pub fn assert(mut self) -> Self {
        self.assertion = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtomKind {
    Terminal(SymbolRange),
    NonTerminal(SymbolId),
}

/// A single grammar production: `non_terminal -> atoms`. An empty
/// `atoms` vector is the epsilon production.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production {
    pub non_terminal: SymbolId,
    pub atoms: Vec<Atom>,
}

impl Production {
    pub fn new(non_terminal: SymbolId, atoms: Vec<Atom>) -> Self {
        Production { non_terminal, atoms }
    }
}

/// A parse-table column: either a group of terminals produced by the
/// `IdGrouper`, or one of the two singleton pseudo-terminals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Group(GroupId),
    End,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableDiagnostic {
    #[error("production {production} targets non-terminal id {non_terminal}, which is outside the declared non-terminal range")]
    UnknownNonTerminal { production: usize, non_terminal: SymbolId },
    #[error("production {production} has a terminal atom {range:?} outside the universe's terminal range")]
    TerminalOutOfRange { production: usize, range: SymbolRange },
    #[error("left recursion detected: non-terminal {0} can derive itself without consuming input")]
    LeftRecursion(SymbolId),
    #[error("production {new_production} and production {existing_production} both apply to non-terminal {non_terminal} on column {column:?}")]
    TableConflict {
        non_terminal: SymbolId,
        column: Column,
        new_production: usize,
        existing_production: usize,
    },
}

/// The built LL(1) parse table plus the FIRST/FOLLOW/PREFIX sets and
/// grouper it was derived from. Immutable once returned from `build`.
#[derive(Debug)]
pub struct ParseTable {
    traits: SymbolTraits,
    grouper: IdGrouper,
    productions: Vec<Production>,
    table: BTreeMap<(SymbolId, Column), usize>,
    first_sets: BTreeMap<SymbolId, SymbolSet>,
    follow_sets: BTreeMap<SymbolId, SymbolSet>,
    prefix_sets: BTreeMap<SymbolId, SymbolSet>,
}

impl ParseTable {
    pub fn traits(&self) -> &SymbolTraits {
        &self.traits
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    pub fn first_set(&self, non_terminal: SymbolId) -> Option<&SymbolSet> {
        self.first_sets.get(&non_terminal)
    }

    pub fn follow_set(&self, non_terminal: SymbolId) -> Option<&SymbolSet> {
        self.follow_sets.get(&non_terminal)
    }

    pub fn prefix_set(&self, non_terminal: SymbolId) -> Option<&SymbolSet> {
        self.prefix_sets.get(&non_terminal)
    }

    fn column_of(&self, id: SymbolId) -> Column {
        if self.traits.is_end(id) {
            Column::End
        } else if self.traits.is_failure(id) {
            Column::Failure
        } else {
            Column::Group(self.grouper.sealed_group_id(id))
        }
    }

    /// The production index to apply for `non_terminal` on lookahead
    /// `lookahead`, if the table has an entry for that cell.
    pub fn get_production(&self, non_terminal: SymbolId, lookahead: SymbolId) -> Option<usize> {
        let column = self.column_of(lookahead);
        self.table.get(&(non_terminal, column)).copied()
    }
}

impl std::fmt::Display for ParseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ParseTable ({} productions) {{", self.productions.len())?;
        for (nt, first) in &self.first_sets {
            writeln!(f, "\tFIRST({nt}) has {} range(s), epsilon={}", first.ranges().len(), first.has_epsilon())?;
        }
        for (nt, follow) in &self.follow_sets {
            writeln!(f, "\tFOLLOW({nt}) has {} range(s)", follow.ranges().len())?;
        }
        write!(f, "}}")
    }
}

fn atom_first(atom: &Atom, first_sets: &BTreeMap<SymbolId, SymbolSet>) -> SymbolSet {
    match atom.kind {
        AtomKind::Terminal(range) => SymbolSet::from_range(range),
        AtomKind::NonTerminal(id) => first_sets.get(&id).cloned().unwrap_or_default(),
    }
}

/// FIRST of an atom sequence (a production's remainder). Assertion
/// atoms contribute their own FIRST set but never stop the scan, since
/// they don't consume input; the first non-assertion atom that cannot
/// derive epsilon stops the scan.
fn sequence_first(atoms: &[Atom], first_sets: &BTreeMap<SymbolId, SymbolSet>) -> SymbolSet {
    let mut result = SymbolSet::new();
    for atom in atoms {
        let af = atom_first(atom, first_sets);
        let mut contribution = af.clone();
        contribution.set_epsilon(false);
        result.add_set(&contribution);
        if atom.assertion {
            continue;
        }
        match atom.kind {
            AtomKind::Terminal(_) => return result,
            AtomKind::NonTerminal(_) => {
                if af.has_epsilon() {
                    continue;
                } else {
                    return result;
                }
            }
        }
    }
    result.set_epsilon(true);
    result
}

fn compute_first_sets(traits: &SymbolTraits, productions: &[Production]) -> BTreeMap<SymbolId, SymbolSet> {
    let mut first_sets: BTreeMap<SymbolId, SymbolSet> = BTreeMap::new();
    for nt in traits.first_nonterminal.0..=traits.last_nonterminal.0 {
        first_sets.insert(SymbolId(nt), SymbolSet::new());
    }
    loop {
        let mut changed = false;
        for production in productions {
            if !first_sets.contains_key(&production.non_terminal) {
                continue;
            }
            let rhs_first = sequence_first(&production.atoms, &first_sets);
            let entry = first_sets.get_mut(&production.non_terminal).unwrap();
            let before = entry.clone();
            entry.add_set(&rhs_first);
            if *entry != before {
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    first_sets
}

fn compute_follow_sets(
    traits: &SymbolTraits,
    productions: &[Production],
    first_sets: &BTreeMap<SymbolId, SymbolSet>,
) -> BTreeMap<SymbolId, SymbolSet> {
    // Every non-terminal's FOLLOW set is seeded with `end`: observed
    // behavior of the source this builder is grounded on (the
    // follow-set of a rule that is never reached at the top level
    // still needs `end` available so FOLLOW-driven epsilon productions
    // don't get stranded without a column to land in).
    let mut follow_sets: BTreeMap<SymbolId, SymbolSet> = BTreeMap::new();
    for nt in traits.first_nonterminal.0..=traits.last_nonterminal.0 {
        let mut seed = SymbolSet::new();
        seed.add(traits.end);
        follow_sets.insert(SymbolId(nt), seed);
    }
    loop {
        let mut changed = false;
        for production in productions {
            for i in 0..production.atoms.len() {
                let AtomKind::NonTerminal(b) = production.atoms[i].kind else {
                    continue;
                };
                if !follow_sets.contains_key(&b) {
                    continue;
                }
                let remainder = &production.atoms[i + 1..];
                let remainder_first = sequence_first(remainder, first_sets);
                let mut contribution = remainder_first.clone();
                contribution.set_epsilon(false);
                if remainder.is_empty() || remainder_first.has_epsilon() {
                    if let Some(lhs_follow) = follow_sets.get(&production.non_terminal).cloned() {
                        contribution.add_set(&lhs_follow);
                    }
                }
                let entry = follow_sets.get_mut(&b).unwrap();
                let before = entry.clone();
                entry.add_set(&contribution);
                if *entry != before {
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    follow_sets
}

fn compute_prefix_sets(
    traits: &SymbolTraits,
    first_sets: &BTreeMap<SymbolId, SymbolSet>,
    follow_sets: &BTreeMap<SymbolId, SymbolSet>,
) -> BTreeMap<SymbolId, SymbolSet> {
    let mut prefix_sets = BTreeMap::new();
    for nt in traits.first_nonterminal.0..=traits.last_nonterminal.0 {
        let nt = SymbolId(nt);
        let first = first_sets.get(&nt).cloned().unwrap_or_default();
        let mut prefix = first.clone();
        prefix.set_epsilon(false);
        if first.has_epsilon() {
            if let Some(follow) = follow_sets.get(&nt) {
                prefix.add_set(follow);
            }
        }
        prefix_sets.insert(nt, prefix);
    }
    prefix_sets
}

/// Non-terminals that can derive themselves without consuming a
/// terminal, found via the classic leading-non-terminal dependency
/// graph. An assertion atom doesn't consume, so scanning a
/// production's leading edge continues past it to the next atom; a
/// non-assertion non-terminal atom that can derive epsilon (per
/// `first_sets`) also doesn't stop the scan, matching `sequence_first`'s
/// own epsilon-threading rule — otherwise left recursion reachable only
/// through a nullable leading non-terminal would go undetected.
fn find_left_recursion(traits: &SymbolTraits, productions: &[Production], first_sets: &BTreeMap<SymbolId, SymbolSet>) -> Vec<SymbolId> {
    let mut edges: BTreeMap<SymbolId, Vec<SymbolId>> = BTreeMap::new();
    for production in productions {
        if !traits.is_nonterminal(production.non_terminal) {
            continue;
        }
        let mut targets = Vec::new();
        for atom in &production.atoms {
            let AtomKind::NonTerminal(b) = atom.kind else {
                if !atom.assertion {
                    break;
                }
                continue;
            };
            targets.push(b);
            if atom.assertion {
                continue;
            }
            let nullable = first_sets.get(&b).is_some_and(|s| s.has_epsilon());
            if !nullable {
                break;
            }
        }
        edges.entry(production.non_terminal).or_default().extend(targets);
    }

    let mut offenders = Vec::new();
    for &start in edges.keys() {
        let mut visited = std::collections::BTreeSet::new();
        let mut stack = vec![start];
        let mut reachable_itself = false;
        while let Some(node) = stack.pop() {
            if let Some(targets) = edges.get(&node) {
                for &t in targets {
                    if t == start {
                        reachable_itself = true;
                    }
                    if visited.insert(t) {
                        stack.push(t);
                    }
                }
            }
        }
        if reachable_itself {
            offenders.push(start);
        }
    }
    offenders
}

fn columns_for_set(traits: &SymbolTraits, grouper: &mut IdGrouper, set: &SymbolSet) -> Vec<Column> {
    let mut columns = Vec::new();
    for range in set.ranges() {
        if range.lo <= traits.last_terminal {
            let clipped_hi = range.hi.min(traits.last_terminal);
            for g in grouper.groups_in_range(SymbolRange::new(range.lo, clipped_hi)) {
                columns.push(Column::Group(g));
            }
            if range.hi <= traits.last_terminal {
                continue;
            }
        }
        let start = if range.lo > traits.last_terminal {
            range.lo
        } else {
            traits.last_terminal.checked_next().unwrap()
        };
        for raw in start.0..=range.hi.0 {
            let id = SymbolId(raw);
            if traits.is_end(id) {
                columns.push(Column::End);
            } else if traits.is_failure(id) {
                columns.push(Column::Failure);
            }
        }
    }
    columns
}

/// Validate, compute FIRST/FOLLOW/PREFIX sets and build the LL(1)
/// parse table for `productions`. Diagnostics are collected rather
/// than short-circuiting; a non-empty diagnostic list means the table
/// should not be trusted for parsing, but it is still returned so
/// tooling can inspect what was built.
pub fn build(traits: SymbolTraits, productions: Vec<Production>) -> (ParseTable, Vec<TableDiagnostic>) {
    let mut diagnostics = Vec::new();
    let mut valid_indices = Vec::with_capacity(productions.len());
    for (index, production) in productions.iter().enumerate() {
        let mut ok = true;
        if !traits.is_nonterminal(production.non_terminal) {
            diagnostics.push(TableDiagnostic::UnknownNonTerminal {
                production: index,
                non_terminal: production.non_terminal,
            });
            ok = false;
        }
        for atom in &production.atoms {
            if let AtomKind::Terminal(range) = atom.kind {
                let is_plain_terminal = range.lo >= traits.first_terminal && range.hi <= traits.last_terminal;
                let is_end_singleton = range.lo == traits.end && range.hi == traits.end;
                let is_failure_singleton = traits.failure.is_some_and(|f| range.lo == f && range.hi == f);
                if !(is_plain_terminal || is_end_singleton || is_failure_singleton) {
                    diagnostics.push(TableDiagnostic::TerminalOutOfRange { production: index, range });
                    ok = false;
                }
            }
        }
        if ok {
            valid_indices.push(index);
        }
    }

    let valid_productions: Vec<Production> = valid_indices.iter().map(|&i| productions[i].clone()).collect();

    let first_sets = compute_first_sets(&traits, &valid_productions);

    for nt in find_left_recursion(&traits, &valid_productions, &first_sets) {
        diagnostics.push(TableDiagnostic::LeftRecursion(nt));
    }

    let follow_sets = compute_follow_sets(&traits, &valid_productions, &first_sets);
    let prefix_sets = compute_prefix_sets(&traits, &first_sets, &follow_sets);

    let mut grouper = IdGrouper::new(traits.first_terminal, traits.last_terminal);
    for production in &valid_productions {
        for atom in &production.atoms {
            if let AtomKind::Terminal(range) = atom.kind {
                grouper.add_use_case(range);
            }
        }
    }

    let mut table: BTreeMap<(SymbolId, Column), usize> = BTreeMap::new();
    for (valid_pos, &orig_index) in valid_indices.iter().enumerate() {
        let production = &valid_productions[valid_pos];
        let rhs_first = sequence_first(&production.atoms, &first_sets);
        let mut columns = columns_for_set(&traits, &mut grouper, &rhs_first);
        if rhs_first.has_epsilon() {
            if let Some(follow) = follow_sets.get(&production.non_terminal) {
                columns.extend(columns_for_set(&traits, &mut grouper, follow));
            }
        }
        for column in columns {
            let key = (production.non_terminal, column);
            match table.get(&key) {
                Some(&existing) if existing != orig_index => {
                    diagnostics.push(TableDiagnostic::TableConflict {
                        non_terminal: production.non_terminal,
                        column,
                        new_production: orig_index,
                        existing_production: existing,
                    });
                }
                _ => {
                    table.insert(key, orig_index);
                }
            }
        }
    }

    let parse_table = ParseTable {
        traits,
        grouper,
        productions,
        table,
        first_sets,
        follow_sets,
        prefix_sets,
    };
    (parse_table, diagnostics)
}
