//! Precomputed side-compatibility tables.
//!
//! Whether rule `r` at a cell can sit next to rule `r'` across slot `i`
//! depends only on our side `i`, the neighbour side that touches it, and
//! whether the two run in opposite directions. That gives 4 x 4 x 2 slot
//! shapes; for each shape we store, per rule, the set of neighbour rules
//! whose facing side (read through the slot adapter) equals ours exactly.

use crate::cells::{FrameAdapter, NeighborSlot};
use crate::rules::{Rgba, RuleCatalog, RuleId, Side};
use bitvec::prelude::*;
use std::collections::HashMap;

const SHAPES: usize = 4 * 4 * 2;

#[inline]
fn shape_index(my_side: Side, neighbor_side: Side, reversed: bool) -> usize {
    my_side.index() * 8 + neighbor_side.index() * 2 + reversed as usize
}

/// `supports[shape][rule]` = neighbour rules compatible with `rule` across that shape.
#[derive(Debug, Clone)]
pub struct Propagator {
    supports: Vec<Vec<BitVec>>,
}

impl Propagator {
    pub fn new(catalog: &RuleCatalog) -> Self {
        let rules = catalog.len();
        let mut supports = Vec::with_capacity(SHAPES);

        for my_side in Side::ALL {
            for neighbor_side in Side::ALL {
                for reversed in [false, true] {
                    debug_assert_eq!(supports.len(), shape_index(my_side, neighbor_side, reversed));
                    let adapter = FrameAdapter::from_sides(my_side, neighbor_side, reversed);
                    let facing = my_side.opposite();

                    // Group neighbour rules by how their facing side reads in our frame
                    let mut by_side: HashMap<Vec<Rgba>, BitVec> = HashMap::new();
                    for rule in catalog.rules() {
                        by_side
                            .entry(adapter.read_side(rule.logical(), facing))
                            .or_insert_with(|| bitvec![0; rules])
                            .set(rule.id(), true);
                    }

                    let table = catalog
                        .rules()
                        .iter()
                        .map(|rule| {
                            by_side
                                .get(&rule.side(my_side))
                                .cloned()
                                .unwrap_or_else(|| bitvec![0; rules])
                        })
                        .collect();
                    supports.push(table);
                }
            }
        }

        Self { supports }
    }

    /// Neighbour rules that `rule` accepts across `slot`, which sits on our `my_side`.
    #[inline]
    pub fn supports(&self, my_side: Side, slot: &NeighborSlot, rule: RuleId) -> &BitSlice {
        &self.supports[shape_index(my_side, slot.side, slot.reversed)][rule]
    }

    /// Exact-match test for one rule pair across a slot.
    pub fn compatible(&self, my_side: Side, slot: &NeighborSlot, rule: RuleId, other: RuleId) -> bool {
        self.supports(my_side, slot, rule)[other]
    }

    /// True if at least one rule in `neighbor_set` accepts `rule` across the slot.
    pub fn is_supported(
        &self,
        my_side: Side,
        slot: &NeighborSlot,
        rule: RuleId,
        neighbor_set: &BitSlice,
    ) -> bool {
        self.supports(my_side, slot, rule)
            .iter_ones()
            .any(|other| neighbor_set[other])
    }
}
