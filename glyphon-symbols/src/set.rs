use crate::{SymbolId, SymbolRange, SymbolTraits};

/// An ordered, disjoint, maximally-coalesced collection of inclusive
/// ID ranges, plus an optional epsilon marker. This is the currency
/// FIRST/FOLLOW/PREFIX sets and ID-grouper use cases are expressed in;
/// two sets containing the same IDs always compare equal regardless of
/// how they were assembled, since ranges are always coalesced on
/// insert.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SymbolSet {
    ranges: Vec<SymbolRange>,
    epsilon: bool,
}

impl SymbolSet {
    pub fn new() -> Self {
        SymbolSet {
            ranges: Vec::new(),
            epsilon: false,
        }
    }

    pub fn epsilon() -> Self {
        SymbolSet {
            ranges: Vec::new(),
            epsilon: true,
        }
    }

    pub fn from_range(range: SymbolRange) -> Self {
        SymbolSet {
            ranges: vec![range],
            epsilon: false,
        }
    }

    pub fn has_epsilon(&self) -> bool {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, value: bool) {
        self.epsilon = value;
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && !self.epsilon
    }

    pub fn ranges(&self) -> &[SymbolRange] {
        &self.ranges
    }

    /// Number of IDs covered, excluding epsilon.
    pub fn len(&self) -> u64 {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.ranges
            .iter()
            .flat_map(|r| (r.lo.0..=r.hi.0).map(SymbolId))
    }

    pub fn add(&mut self, id: SymbolId) {
        self.add_range(SymbolRange::single(id));
    }

    pub fn add_range(&mut self, range: SymbolRange) {
        let mut merged = range;
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        let n = self.ranges.len();
        let mut i = 0;
        while i < n && !self.ranges[i].adjacent_or_overlaps(&merged) && self.ranges[i].hi < merged.lo {
            out.push(self.ranges[i]);
            i += 1;
        }
        while i < n && self.ranges[i].adjacent_or_overlaps(&merged) {
            merged = SymbolRange::new(merged.lo.min(self.ranges[i].lo), merged.hi.max(self.ranges[i].hi));
            i += 1;
        }
        out.push(merged);
        while i < n {
            out.push(self.ranges[i]);
            i += 1;
        }
        self.ranges = out;
    }

    pub fn remove(&mut self, id: SymbolId) {
        self.remove_range(SymbolRange::single(id));
    }

    pub fn remove_range(&mut self, range: SymbolRange) {
        let mut out = Vec::with_capacity(self.ranges.len());
        for existing in self.ranges.drain(..) {
            if !existing.overlaps(&range) {
                out.push(existing);
                continue;
            }
            if existing.lo < range.lo {
                out.push(SymbolRange::new(existing.lo, range.lo.checked_prev().unwrap()));
            }
            if existing.hi > range.hi {
                out.push(SymbolRange::new(range.hi.checked_next().unwrap(), existing.hi));
            }
        }
        self.ranges = out;
    }

    pub fn includes(&self, id: SymbolId) -> bool {
        self.ranges.iter().any(|r| r.contains(id))
    }

    pub fn includes_range(&self, range: &SymbolRange) -> bool {
        self.ranges.iter().any(|r| r.lo <= range.lo && range.hi <= r.hi)
    }

    /// Subset test: every ID (and, if present, epsilon) in `other` is
    /// also in `self`.
    pub fn includes_set(&self, other: &SymbolSet) -> bool {
        if other.epsilon && !self.epsilon {
            return false;
        }
        other.ranges.iter().all(|r| self.includes_range(r))
    }

    pub fn add_set(&mut self, other: &SymbolSet) {
        for r in &other.ranges {
            self.add_range(*r);
        }
        if other.epsilon {
            self.epsilon = true;
        }
    }

    pub fn remove_set(&mut self, other: &SymbolSet) {
        for r in &other.ranges {
            self.remove_range(*r);
        }
        if other.epsilon {
            self.epsilon = false;
        }
    }

    /// Union, returning a new set.
    pub fn union(&self, other: &SymbolSet) -> SymbolSet {
        let mut out = self.clone();
        out.add_set(other);
        out
    }

    /// Set difference `self - other`, returning a new set.
    pub fn difference(&self, other: &SymbolSet) -> SymbolSet {
        let mut out = self.clone();
        out.remove_set(other);
        out
    }

    /// Complement within the universe's terminal range, with epsilon
    /// toggled. `inverse(traits).inverse(traits) == self` for any set
    /// whose ranges lie entirely within the universe's terminals.
    pub fn inverse(&self, traits: &SymbolTraits) -> SymbolSet {
        let mut out = SymbolSet::from_range(traits.terminal_range());
        out.remove_set(&SymbolSet {
            ranges: self.ranges.clone(),
            epsilon: false,
        });
        out.epsilon = !self.epsilon;
        out
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
    fn add_coalesces_adjacent_ranges() {
        let mut s = SymbolSet::new();
        s.add_range(range(0, 5));
        s.add_range(range(6, 9));
        assert_eq!(s.ranges(), &[range(0, 9)]);
    }

    #[test]
    fn add_coalesces_overlapping_ranges() {
        let mut s = SymbolSet::new();
        s.add_range(range(10, 20));
        s.add_range(range(15, 25));
        assert_eq!(s.ranges(), &[range(10, 25)]);
    }

    #[test]
    fn remove_splits_range() {
        let mut s = SymbolSet::new();
        s.add_range(range(0, 100));
        s.remove_range(range(40, 60));
        assert_eq!(s.ranges(), &[range(0, 39), range(61, 100)]);
    }

    #[test]
    fn remove_point_from_singleton() {
        let mut s = SymbolSet::new();
        s.add(id(5));
        s.remove(id(5));
        assert!(s.ranges().is_empty());
    }

    #[test]
    fn includes_and_subset() {
        let mut a = SymbolSet::new();
        a.add_range(range(0, 10));
        let mut b = SymbolSet::new();
        b.add_range(range(2, 4));
        assert!(a.includes_set(&b));
        assert!(!b.includes_set(&a));
    }

    #[test]
    fn inverse_is_involutive() {
        let traits = SymbolTraits::glyph(2);
        let mut s = SymbolSet::new();
        s.add_range(range(10, 20));
        s.add_range(range(100, 200));
        let double_inverse = s.inverse(&traits).inverse(&traits);
        assert_eq!(s, double_inverse);
    }

    #[test]
    fn inverse_toggles_epsilon() {
        let traits = SymbolTraits::glyph(1);
        let mut s = SymbolSet::new();
        s.set_epsilon(true);
        let inv = s.inverse(&traits);
        assert!(!inv.has_epsilon());
        s.set_epsilon(false);
        let inv2 = s.inverse(&traits);
        assert!(inv2.has_epsilon());
    }

    #[test]
    fn union_and_difference() {
        let mut a = SymbolSet::new();
        a.add_range(range(0, 5));
        let mut b = SymbolSet::new();
        b.add_range(range(3, 10));
        let u = a.union(&b);
        assert_eq!(u.ranges(), &[range(0, 10)]);
        let d = u.difference(&b);
        assert_eq!(d.ranges(), &[range(0, 2)]);
    }
}
