//! Collapse-order heuristics.
//!
//! The default picks the cell with the *most* remaining rules, the reverse
//! of the usual lowest-entropy choice. [`FewestPossibilities`] gives the
//! textbook order. Ties go to the lowest cell index.

use super::possibility::PossibilityWave;
use crate::cells::CellId;
use crate::config::HeuristicKind;

/// Chooses the next cell to collapse.
pub trait CollapseHeuristic: Send + Sync {
    /// An unresolved cell (more than one rule left), or `None` when every
    /// cell is resolved.
    fn select(&self, wave: &PossibilityWave) -> Option<CellId>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MostPossibilities;

impl CollapseHeuristic for MostPossibilities {
    fn select(&self, wave: &PossibilityWave) -> Option<CellId> {
        let mut best: Option<(CellId, usize)> = None;
        for cell in 0..wave.len() {
            let count = wave.count(cell);
            if count > 1 && best.map_or(true, |(_, c)| count > c) {
                best = Some((cell, count));
            }
        }
        best.map(|(cell, _)| cell)
    }

    fn name(&self) -> &str {
        "most-possibilities"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FewestPossibilities;

impl CollapseHeuristic for FewestPossibilities {
    fn select(&self, wave: &PossibilityWave) -> Option<CellId> {
        let mut best: Option<(CellId, usize)> = None;
        for cell in 0..wave.len() {
            let count = wave.count(cell);
            if count > 1 && best.map_or(true, |(_, c)| count < c) {
                best = Some((cell, count));
            }
        }
        best.map(|(cell, _)| cell)
    }

    fn name(&self) -> &str {
        "fewest-possibilities"
    }
}

impl HeuristicKind {
    pub fn build(self) -> Box<dyn CollapseHeuristic> {
        match self {
            HeuristicKind::MostPossibilities => Box::new(MostPossibilities),
            HeuristicKind::FewestPossibilities => Box::new(FewestPossibilities),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::prelude::*;

    fn wave_with_counts(counts: &[usize]) -> PossibilityWave {
        let rules = 5;
        let mut wave = PossibilityWave::new(counts.len(), rules, &bitvec![1; rules]);
        for (cell, &count) in counts.iter().enumerate() {
            let mut set = bitvec![0; rules];
            set[..count].fill(true);
            wave.replace(cell, set);
        }
        wave
    }

    #[test]
    fn test_most_picks_first_largest() {
        let wave = wave_with_counts(&[2, 4, 1, 4]);
        assert_eq!(MostPossibilities.select(&wave), Some(1));
    }

    #[test]
    fn test_fewest_skips_resolved() {
        let wave = wave_with_counts(&[3, 1, 2, 2]);
        assert_eq!(FewestPossibilities.select(&wave), Some(2));
    }

    #[test]
    fn test_done_when_all_resolved() {
        let wave = wave_with_counts(&[1, 1, 1]);
        assert_eq!(MostPossibilities.select(&wave), None);
        assert_eq!(FewestPossibilities.select(&wave), None);
    }

    #[test]
    fn test_kind_builds_matching_heuristic() {
        assert_eq!(HeuristicKind::MostPossibilities.build().name(), "most-possibilities");
        assert_eq!(HeuristicKind::FewestPossibilities.build().name(), "fewest-possibilities");
    }
}
