//! Per-cell possibility sets.
//!
//! The wave tracks which rules are still possible at each cell as one bitset
//! per cell, plus a cached count, and the cell's initial domain so a
//! contradiction can restore it.

use crate::rules::RuleId;
use bitvec::prelude::*;

/// Possibility state for every cell of a graph.
#[derive(Debug, Clone)]
pub struct PossibilityWave {
    /// `sets[cell][rule]` is true while the rule is possible at the cell.
    sets: Vec<BitVec>,
    /// Cached `sets[cell].count_ones()`.
    counts: Vec<usize>,
    /// Domain each unpinned cell returns to on reset.
    initial: Vec<BitVec>,
    pinned: Vec<bool>,
}

impl PossibilityWave {
    /// All cells start with `domain`.
    pub fn new(cells: usize, rules: usize, domain: &BitVec) -> Self {
        debug_assert_eq!(domain.len(), rules);
        let count = domain.count_ones();
        Self {
            sets: vec![domain.clone(); cells],
            counts: vec![count; cells],
            initial: vec![domain.clone(); cells],
            pinned: vec![false; cells],
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    #[inline]
    pub fn get(&self, cell: usize) -> &BitSlice {
        &self.sets[cell]
    }

    #[inline]
    pub fn count(&self, cell: usize) -> usize {
        self.counts[cell]
    }

    pub fn is_pinned(&self, cell: usize) -> bool {
        self.pinned[cell]
    }

    pub fn is_resolved(&self, cell: usize) -> bool {
        self.counts[cell] == 1
    }

    /// The single remaining rule, if resolved.
    pub fn resolved_rule(&self, cell: usize) -> Option<RuleId> {
        if self.counts[cell] == 1 {
            self.sets[cell].first_one()
        } else {
            None
        }
    }

    pub fn iter_rules(&self, cell: usize) -> impl Iterator<Item = RuleId> + '_ {
        self.sets[cell].iter_ones()
    }

    /// Replace a cell's set. Returns true if the set shrank.
    pub fn replace(&mut self, cell: usize, set: BitVec) -> bool {
        let count = set.count_ones();
        debug_assert!(count <= self.counts[cell], "possibility sets only shrink");
        let shrank = count < self.counts[cell];
        self.sets[cell] = set;
        self.counts[cell] = count;
        shrank
    }

    /// Collapse a cell to one rule.
    pub fn collapse(&mut self, cell: usize, rule: RuleId) {
        let set = &mut self.sets[cell];
        set.fill(false);
        set.set(rule, true);
        self.counts[cell] = 1;
    }

    /// Force a cell to one rule and exempt it from propagation and resets.
    pub fn pin(&mut self, cell: usize, rule: RuleId) {
        self.collapse(cell, rule);
        self.initial[cell] = self.sets[cell].clone();
        self.pinned[cell] = true;
    }

    /// Narrow a cell's initial domain (before solving starts).
    pub fn restrict_domain(&mut self, cell: usize, mut domain: BitVec) {
        domain &= self.initial[cell].as_bitslice();
        self.counts[cell] = domain.count_ones();
        self.sets[cell] = domain.clone();
        self.initial[cell] = domain;
    }

    /// Restore every unpinned cell to its initial domain.
    pub fn reset_unpinned(&mut self) {
        for cell in 0..self.sets.len() {
            if !self.pinned[cell] {
                self.sets[cell].copy_from_bitslice(&self.initial[cell]);
                self.counts[cell] = self.sets[cell].count_ones();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(rules: usize) -> BitVec {
        bitvec![1; rules]
    }

    #[test]
    fn test_new_wave_is_full() {
        let wave = PossibilityWave::new(3, 5, &full(5));
        assert_eq!(wave.len(), 3);
        assert!((0..3).all(|c| wave.count(c) == 5));
        assert!((0..3).all(|c| !wave.is_resolved(c)));
    }

    #[test]
    fn test_collapse_and_resolve() {
        let mut wave = PossibilityWave::new(2, 4, &full(4));
        wave.collapse(1, 2);
        assert!(wave.is_resolved(1));
        assert_eq!(wave.resolved_rule(1), Some(2));
        assert_eq!(wave.resolved_rule(0), None);
        assert_eq!(wave.iter_rules(1).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_replace_reports_shrink() {
        let mut wave = PossibilityWave::new(1, 4, &full(4));
        assert!(!wave.replace(0, full(4)));
        assert!(wave.replace(0, bitvec![1, 0, 1, 0]));
        assert_eq!(wave.count(0), 2);
    }

    #[test]
    fn test_reset_keeps_pins() {
        let mut wave = PossibilityWave::new(3, 4, &full(4));
        wave.pin(0, 3);
        wave.collapse(1, 1);
        wave.replace(2, bitvec![0; 4]);

        wave.reset_unpinned();
        assert_eq!(wave.resolved_rule(0), Some(3));
        assert!(wave.is_pinned(0));
        assert_eq!(wave.count(1), 4);
        assert_eq!(wave.count(2), 4);
    }

    #[test]
    fn test_restricted_domain_survives_reset() {
        let mut wave = PossibilityWave::new(1, 4, &bitvec![1, 1, 1, 0]);
        wave.restrict_domain(0, bitvec![0, 1, 1, 1]);
        assert_eq!(wave.count(0), 2);
        wave.collapse(0, 1);
        wave.reset_unpinned();
        assert_eq!(wave.iter_rules(0).collect::<Vec<_>>(), vec![1, 2]);
    }
}
