//! Solve events for logging and visualization.
//!
//! # Example
//!
//! ```ignore
//! struct Printer;
//!
//! impl SolveObserver for Printer {
//!     fn on_collapse(&mut self, cell: CellId, rule: RuleId, remaining: usize) {
//!         info!("cell {} -> rule {} ({} were left)", cell, rule, remaining);
//!     }
//! }
//! ```

use crate::cells::CellId;
use crate::rules::RuleId;

/// Hooks called by the solver as it moves through its states.
///
/// All methods default to doing nothing.
pub trait SolveObserver {
    /// A cell was collapsed at random during seeding.
    fn on_seed(&mut self, _cell: CellId, _rule: RuleId) {}

    /// A cell was collapsed by the heuristic; `remaining` is the set size before.
    fn on_collapse(&mut self, _cell: CellId, _rule: RuleId, _remaining: usize) {}

    /// Propagation shrank a cell's set from `before` to `after` rules.
    fn on_propagate(&mut self, _cell: CellId, _before: usize, _after: usize) {}

    /// `cell` lost every rule and the graph was reset.
    fn on_reset(&mut self, _cell: CellId, _resets: usize) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SolveObserver for NoopObserver {}

/// One recorded solver event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveEvent {
    Seed { cell: CellId, rule: RuleId },
    Collapse { cell: CellId, rule: RuleId, remaining: usize },
    Propagate { cell: CellId, before: usize, after: usize },
    Reset { cell: CellId, resets: usize },
}

/// Observer that records every event in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<SolveEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resets(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SolveEvent::Reset { .. }))
            .count()
    }
}

impl SolveObserver for EventLog {
    fn on_seed(&mut self, cell: CellId, rule: RuleId) {
        self.events.push(SolveEvent::Seed { cell, rule });
    }

    fn on_collapse(&mut self, cell: CellId, rule: RuleId, remaining: usize) {
        self.events.push(SolveEvent::Collapse {
            cell,
            rule,
            remaining,
        });
    }

    fn on_propagate(&mut self, cell: CellId, before: usize, after: usize) {
        self.events.push(SolveEvent::Propagate {
            cell,
            before,
            after,
        });
    }

    fn on_reset(&mut self, cell: CellId, resets: usize) {
        self.events.push(SolveEvent::Reset { cell, resets });
    }
}

/// Counters for one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// State-machine steps taken.
    pub steps: usize,
    /// Cells popped from the propagation queue.
    pub propagations: usize,
    /// Heuristic collapses (seeding not included).
    pub collapses: usize,
    /// Contradiction resets.
    pub resets: usize,
}
