//! Partitions a symbol universe's terminal range into equivalence
//! classes ("groups") based on the inclusive ranges callers submit as
//! "use cases" — every terminal range a grammar's productions mention.
//! One parse-table column is needed per group rather than per
//! terminal, since within a group every terminal behaves identically
//! with respect to every production that was used to build the
//! partition.
//!
//! Mirrors the boundary-point construction `lapex-lexer`'s `Alphabet`
//! uses to turn a set of character ranges into a minimal disjoint
//! partition, generalized from `char` to any `SymbolId` range and from
//! a one-shot build to a monotone, lazily-sealed structure.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use glyphon_symbols::{SymbolId, SymbolRange};

/// The index of a group produced by a sealed `IdGrouper`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GroupId(pub u32);

/// A monotone partition builder: use cases can only be added, and the
/// partition is computed once, lazily, the first time a lookup is
/// requested. After that point adding further use cases is a usage
/// error, since it would invalidate group IDs already handed out.
#[derive(Debug)]
pub struct IdGrouper {
    first_id: SymbolId,
    last_id: SymbolId,
    use_cases: Vec<SymbolRange>,
    sealed: Option<Vec<SymbolRange>>,
}

impl IdGrouper {
    pub fn new(first_id: SymbolId, last_id: SymbolId) -> Self {
        assert!(first_id <= last_id, "IdGrouper: empty universe");
        IdGrouper {
            first_id,
            last_id,
            use_cases: Vec::new(),
            sealed: None,
        }
    }

    /// Register a terminal range as a use case. Panics if the grouper
    /// has already sealed (i.e. a lookup already happened), or if the
    /// range falls outside the universe this grouper was built for.
    pub fn add_use_case(&mut self, range: SymbolRange) {
        assert!(
            self.sealed.is_none(),
            "IdGrouper::add_use_case called after sealing"
        );
        assert!(
            range.lo >= self.first_id && range.hi <= self.last_id,
            "IdGrouper::add_use_case range out of universe bounds"
        );
        self.use_cases.push(range);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.is_some()
    }

    fn seal(&mut self) {
        if self.sealed.is_some() {
            return;
        }
        let mut cuts: BTreeSet<SymbolId> = BTreeSet::new();
        cuts.insert(self.first_id);
        for uc in &self.use_cases {
            cuts.insert(uc.lo);
            if let Some(next) = uc.hi.checked_next() {
                if next <= self.last_id {
                    cuts.insert(next);
                }
            }
        }
        let starts: Vec<SymbolId> = cuts.into_iter().collect();
        let mut ranges = Vec::with_capacity(starts.len());
        for (i, &start) in starts.iter().enumerate() {
            let end = match starts.get(i + 1) {
                Some(next_start) => next_start.checked_prev().unwrap(),
                None => self.last_id,
            };
            ranges.push(SymbolRange::new(start, end));
        }
        self.sealed = Some(ranges);
    }

    /// Number of groups in the sealed partition. Seals on first call.
    pub fn group_count(&mut self) -> usize {
        self.seal();
        self.sealed.as_ref().unwrap().len()
    }

    /// The group an ID falls into. Seals on first call.
    pub fn get_group_id(&mut self, id: SymbolId) -> GroupId {
        self.seal();
        let ranges = self.sealed.as_ref().unwrap();
        let idx = ranges
            .binary_search_by(|r| {
                if id < r.lo {
                    Ordering::Greater
                } else if id > r.hi {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .unwrap_or_else(|_| panic!("IdGrouper::get_group_id: {id} outside universe bounds"));
        GroupId(idx as u32)
    }

    /// The inclusive range of IDs backing a group. Seals on first call.
    pub fn get_symbol_range(&mut self, group: GroupId) -> SymbolRange {
        self.seal();
        self.sealed.as_ref().unwrap()[group.0 as usize]
    }

    /// Read-only lookup for use after sealing (e.g. from an immutable
    /// parse table). Panics if the grouper hasn't sealed yet or `id`
    /// falls outside the universe.
    pub fn sealed_group_id(&self, id: SymbolId) -> GroupId {
        let ranges = self
            .sealed
            .as_ref()
            .expect("IdGrouper::sealed_group_id called before sealing");
        let idx = ranges
            .binary_search_by(|r| {
                if id < r.lo {
                    Ordering::Greater
                } else if id > r.hi {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .unwrap_or_else(|_| panic!("IdGrouper::sealed_group_id: {id} outside universe bounds"));
        GroupId(idx as u32)
    }

    /// All groups fully contained in `range`, in ascending order.
    /// `range`'s endpoints must align with group boundaries (true for
    /// any range built purely from unions of submitted use cases).
    pub fn groups_in_range(&mut self, range: SymbolRange) -> Vec<GroupId> {
        let lo = self.get_group_id(range.lo).0;
        let hi = self.get_group_id(range.hi).0;
        (lo..=hi).map(GroupId).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> SymbolId {
        SymbolId(n)
    }

    fn range(a: u32, b: u32) -> SymbolRange {
        SymbolRange::new(id(a), id(b))
    }

    #[test]
    fn no_use_cases_yields_one_group() {
        let mut g = IdGrouper::new(id(0), id(100));
        assert_eq!(g.group_count(), 1);
        assert_eq!(g.get_symbol_range(GroupId(0)), range(0, 100));
    }

    #[test]
    fn disjoint_use_cases_partition_into_three() {
        let mut g = IdGrouper::new(id(0), id(99));
        g.add_use_case(range(10, 20));
        g.add_use_case(range(50, 60));
        assert_eq!(g.group_count(), 5);
        assert_eq!(g.get_group_id(id(0)), GroupId(0));
        assert_eq!(g.get_group_id(id(10)), GroupId(1));
        assert_eq!(g.get_group_id(id(20)), GroupId(1));
        assert_eq!(g.get_group_id(id(21)), GroupId(2));
        assert_eq!(g.get_group_id(id(50)), GroupId(3));
        assert_eq!(g.get_group_id(id(99)), GroupId(4));
    }

    #[test]
    fn overlapping_use_cases_refine_each_other() {
        let mut g = IdGrouper::new(id(0), id(99));
        g.add_use_case(range(10, 60));
        g.add_use_case(range(30, 40));
        // boundaries at 0,10,30,41,61 -> 5 groups
        assert_eq!(g.group_count(), 5);
        assert_eq!(g.get_group_id(id(20)), g.get_group_id(id(25)));
        assert_ne!(g.get_group_id(id(20)), g.get_group_id(id(35)));
        assert_ne!(g.get_group_id(id(35)), g.get_group_id(id(45)));
    }

    #[test]
    fn groups_in_range_covers_whole_span() {
        let mut g = IdGrouper::new(id(0), id(99));
        g.add_use_case(range(10, 20));
        g.add_use_case(range(50, 60));
        let groups = g.groups_in_range(range(10, 60));
        assert_eq!(groups, vec![GroupId(1), GroupId(2), GroupId(3)]);
    }

    #[test]
    #[should_panic]
    fn add_use_case_after_seal_panics() {
        let mut g = IdGrouper::new(id(0), id(10));
        let _ = g.group_count();
        g.add_use_case(range(1, 2));
    }
}
