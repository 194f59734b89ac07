//! The graph WFC solver.
//!
//! The solver is a small state machine stepped one transition at a time:
//!
//! ```text
//!   Seeding ──► Propagating ──► Selecting ──► Done
//!      ▲             │  ▲            │
//!      │             │  └────────────┘ (collapse one cell)
//!      │             ▼
//!      └──────── Resetting (a cell ran out of rules)
//! ```
//!
//! - **Seeding** queues the neighbours of every resolved cell (pins and
//!   single-rule domains). With no such cell it collapses a random cell to a
//!   random rule first.
//! - **Propagating** pops one queued cell and keeps only the rules that every
//!   live neighbour still supports. A shrink re-queues the unresolved
//!   neighbours; an empty set moves to Resetting.
//! - **Selecting** asks the heuristic for a cell, collapses it to a random
//!   remaining rule, and goes back to Propagating. No candidate means Done.
//! - **Resetting** returns every unpinned cell to its initial domain and
//!   clears the queue. There is no local backtracking.
//!
//! Reset, step and cancellation budgets turn the unbounded loop into
//! [`SolveError`]s.

use super::compat::Propagator;
use super::heuristic::CollapseHeuristic;
use super::observer::{NoopObserver, SolveObserver, SolveStats};
use super::possibility::PossibilityWave;
use crate::cells::{CellGraph, CellId};
use crate::config::{BorderPolicy, SolverConfig};
use crate::rng::{StdRandom, TileRng};
use crate::rules::{sides_compatible, RuleCatalog, RuleId, Side};
use crate::topology::NodeId;
use bevy_log::{debug, info, warn};
use bitvec::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Global solver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverPhase {
    Seeding,
    Propagating,
    Selecting,
    Resetting,
    Done,
}

/// Per-cell state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// More than one rule left.
    Unresolved,
    /// Exactly one rule left.
    Resolved,
    /// Forced before solving; never touched by propagation or resets.
    Pinned,
    /// No rule left. Only visible between a contradiction and the reset.
    Contradicted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// The reset budget ran out.
    Unsolvable { resets: usize },
    /// The step budget ran out.
    Exhausted { steps: usize },
    /// The cancel flag was raised.
    Cancelled,
    /// No rule is available for free placement.
    EmptyCatalog,
    /// The border policy needs a fallback rule and the catalog has none.
    MissingFallback,
    InvalidPin { cell: CellId, rule: RuleId },
    /// Two pinned neighbours disagree on their shared side.
    ConflictingPins { cell: CellId, side: Side },
    /// Pins must be placed before the first step.
    AlreadyStarted,
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Unsolvable { resets } => {
                write!(f, "no solution found after {} resets", resets)
            }
            SolveError::Exhausted { steps } => write!(f, "step budget exhausted after {} steps", steps),
            SolveError::Cancelled => write!(f, "solve cancelled"),
            SolveError::EmptyCatalog => write!(f, "no placeable rules in catalog"),
            SolveError::MissingFallback => write!(f, "border policy needs a fallback rule"),
            SolveError::InvalidPin { cell, rule } => {
                write!(f, "cannot pin rule {} on cell {}", rule, cell)
            }
            SolveError::ConflictingPins { cell, side } => {
                write!(f, "pinned cell {} conflicts with its {:?} neighbour", cell, side)
            }
            SolveError::AlreadyStarted => write!(f, "solver already started"),
        }
    }
}

impl std::error::Error for SolveError {}

/// WFC solver over a [`CellGraph`].
pub struct Solver<'a> {
    graph: &'a CellGraph,
    catalog: &'a RuleCatalog,
    config: SolverConfig,
    propagator: Propagator,
    heuristic: Box<dyn CollapseHeuristic>,
    wave: PossibilityWave,
    queue: VecDeque<CellId>,
    queued: Vec<bool>,
    phase: SolverPhase,
    contradiction: Option<CellId>,
    stats: SolveStats,
    cancel: Arc<AtomicBool>,
}

impl<'a> Solver<'a> {
    pub fn new(
        graph: &'a CellGraph,
        catalog: &'a RuleCatalog,
        config: SolverConfig,
    ) -> Result<Self, SolveError> {
        let rules = catalog.len();
        let mut domain = bitvec![0; rules];
        for id in catalog.placeable() {
            domain.set(id, true);
        }
        if domain.not_any() {
            return Err(SolveError::EmptyCatalog);
        }

        let mut wave = PossibilityWave::new(graph.len(), rules, &domain);
        apply_border(&mut wave, graph, catalog, config.border)?;

        let solver = Self {
            graph,
            catalog,
            propagator: Propagator::new(catalog),
            heuristic: config.heuristic.build(),
            config,
            wave,
            queue: VecDeque::new(),
            queued: vec![false; graph.len()],
            phase: SolverPhase::Seeding,
            contradiction: None,
            stats: SolveStats::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        };
        solver.check_pins()?;
        Ok(solver)
    }

    /// Replace the collapse heuristic.
    pub fn with_heuristic(mut self, heuristic: Box<dyn CollapseHeuristic>) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Force `cell` to `rule` for the whole solve. Excluded rules may be pinned.
    pub fn pin(&mut self, cell: CellId, rule: RuleId) -> Result<(), SolveError> {
        if self.stats.steps > 0 {
            return Err(SolveError::AlreadyStarted);
        }
        if cell >= self.graph.len() || rule >= self.catalog.len() {
            return Err(SolveError::InvalidPin { cell, rule });
        }
        self.wave.pin(cell, rule);
        Ok(())
    }

    /// Pin a group of cells, e.g. the footprint of a pre-placed multi-cell tile.
    pub fn pin_all(
        &mut self,
        pins: impl IntoIterator<Item = (CellId, RuleId)>,
    ) -> Result<(), SolveError> {
        for (cell, rule) in pins {
            self.pin(cell, rule)?;
        }
        Ok(())
    }

    /// Shared flag; setting it makes the next step fail with `Cancelled`.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn phase(&self) -> SolverPhase {
        self.phase
    }

    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn graph(&self) -> &CellGraph {
        self.graph
    }

    pub fn wave(&self) -> &PossibilityWave {
        &self.wave
    }

    pub fn possibilities(&self, cell: CellId) -> &BitSlice {
        self.wave.get(cell)
    }

    pub fn cell_state(&self, cell: CellId) -> CellState {
        if self.wave.is_pinned(cell) {
            CellState::Pinned
        } else {
            match self.wave.count(cell) {
                0 => CellState::Contradicted,
                1 => CellState::Resolved,
                _ => CellState::Unresolved,
            }
        }
    }

    /// Cells waiting for propagation, front first.
    pub fn queued_cells(&self) -> Vec<CellId> {
        self.queue.iter().copied().collect()
    }

    /// Advance one transition.
    pub fn step(&mut self, rng: &mut dyn TileRng) -> Result<SolverPhase, SolveError> {
        self.step_with(rng, &mut NoopObserver)
    }

    pub fn step_with(
        &mut self,
        rng: &mut dyn TileRng,
        observer: &mut dyn SolveObserver,
    ) -> Result<SolverPhase, SolveError> {
        if self.phase == SolverPhase::Done {
            return Ok(SolverPhase::Done);
        }
        if self.cancel.load(Ordering::Relaxed) {
            return Err(SolveError::Cancelled);
        }
        if let Some(max) = self.config.max_steps {
            if self.stats.steps >= max {
                return Err(SolveError::Exhausted {
                    steps: self.stats.steps,
                });
            }
        }
        self.stats.steps += 1;

        self.phase = match self.phase {
            SolverPhase::Seeding => self.seed(rng, observer)?,
            SolverPhase::Propagating => self.propagate_one(observer),
            SolverPhase::Selecting => self.select(rng, observer),
            SolverPhase::Resetting => self.reset(observer)?,
            SolverPhase::Done => SolverPhase::Done,
        };
        Ok(self.phase)
    }

    /// Step until done.
    pub fn run(&mut self, rng: &mut dyn TileRng) -> Result<Assignment, SolveError> {
        self.run_with(rng, &mut NoopObserver)
    }

    pub fn run_with(
        &mut self,
        rng: &mut dyn TileRng,
        observer: &mut dyn SolveObserver,
    ) -> Result<Assignment, SolveError> {
        info!(
            "solving {} cells with {} rules ({})",
            self.graph.len(),
            self.catalog.len(),
            self.heuristic.name()
        );

        while self.step_with(rng, observer)? != SolverPhase::Done {}

        info!(
            "solved in {} steps: {} collapses, {} propagations, {} resets",
            self.stats.steps, self.stats.collapses, self.stats.propagations, self.stats.resets
        );
        self.assignment().ok_or(SolveError::Unsolvable {
            resets: self.stats.resets,
        })
    }

    /// The collapsed assignment, once every cell is resolved.
    pub fn assignment(&self) -> Option<Assignment> {
        let rules = (0..self.graph.len())
            .map(|cell| self.wave.resolved_rule(cell))
            .collect::<Option<Vec<_>>>()?;
        let nodes = self.graph.cells().iter().map(|c| c.node).collect();
        Some(Assignment { rules, nodes })
    }

    fn seed(
        &mut self,
        rng: &mut dyn TileRng,
        observer: &mut dyn SolveObserver,
    ) -> Result<SolverPhase, SolveError> {
        if let Some(cell) = (0..self.wave.len()).find(|c| self.wave.count(*c) == 0) {
            warn!("cell {} has no admissible rule at all", cell);
            return Err(SolveError::Unsolvable {
                resets: self.stats.resets,
            });
        }

        self.check_pins()?;

        let mut seeds: Vec<CellId> = (0..self.wave.len())
            .filter(|c| self.wave.is_resolved(*c))
            .collect();

        if seeds.is_empty() && !self.wave.is_empty() {
            let cell = rng.next_usize_max(self.wave.len());
            let rule = self.random_rule(cell, rng);
            self.wave.collapse(cell, rule);
            observer.on_seed(cell, rule);
            debug!("seeded cell {} with rule {}", cell, rule);
            seeds.push(cell);
        }

        let graph = self.graph;
        for cell in seeds {
            for (_, slot) in graph.neighbors(cell) {
                self.enqueue(slot.cell);
            }
        }
        Ok(SolverPhase::Propagating)
    }

    /// Propagation never revises pinned cells, so adjacent pins are checked here.
    fn check_pins(&self) -> Result<(), SolveError> {
        for cell in (0..self.wave.len()).filter(|c| self.wave.is_pinned(*c)) {
            let Some(rule) = self.wave.resolved_rule(cell) else {
                continue;
            };
            for (side, slot) in self.graph.neighbors(cell) {
                if !self.wave.is_pinned(slot.cell) {
                    continue;
                }
                let Some(other) = self.wave.resolved_rule(slot.cell) else {
                    continue;
                };
                if !self.propagator.compatible(side, slot, rule, other) {
                    warn!(
                        "pinned cell {} ({:?}) conflicts with pinned cell {}",
                        cell, side, slot.cell
                    );
                    return Err(SolveError::ConflictingPins { cell, side });
                }
            }
        }
        Ok(())
    }

    fn propagate_one(&mut self, observer: &mut dyn SolveObserver) -> SolverPhase {
        let Some(cell) = self.queue.pop_front() else {
            return SolverPhase::Selecting;
        };
        self.queued[cell] = false;
        self.stats.propagations += 1;

        if self.wave.is_pinned(cell) {
            return SolverPhase::Propagating;
        }

        let before = self.wave.count(cell);
        let mut kept = self.wave.get(cell).to_bitvec();
        for rule in self.wave.iter_rules(cell) {
            let supported = self.graph.neighbors(cell).all(|(side, slot)| {
                self.propagator
                    .is_supported(side, slot, rule, self.wave.get(slot.cell))
            });
            if !supported {
                kept.set(rule, false);
            }
        }

        let after = kept.count_ones();
        if after == 0 {
            self.wave.replace(cell, kept);
            self.contradiction = Some(cell);
            return SolverPhase::Resetting;
        }

        if self.wave.replace(cell, kept) {
            observer.on_propagate(cell, before, after);
            self.enqueue_unresolved_neighbors(cell);
        }
        SolverPhase::Propagating
    }

    fn select(&mut self, rng: &mut dyn TileRng, observer: &mut dyn SolveObserver) -> SolverPhase {
        let Some(cell) = self.heuristic.select(&self.wave) else {
            return SolverPhase::Done;
        };

        let remaining = self.wave.count(cell);
        let rule = self.random_rule(cell, rng);
        self.wave.collapse(cell, rule);
        self.stats.collapses += 1;
        observer.on_collapse(cell, rule, remaining);

        self.enqueue_unresolved_neighbors(cell);
        SolverPhase::Propagating
    }

    fn reset(&mut self, observer: &mut dyn SolveObserver) -> Result<SolverPhase, SolveError> {
        let cell = self.contradiction.take().unwrap_or_default();
        if let Some(max) = self.config.max_resets {
            if self.stats.resets >= max {
                warn!("giving up after {} resets", self.stats.resets);
                return Err(SolveError::Unsolvable {
                    resets: self.stats.resets,
                });
            }
        }

        self.stats.resets += 1;
        warn!(
            "contradiction at cell {}, resetting (reset {})",
            cell, self.stats.resets
        );
        observer.on_reset(cell, self.stats.resets);

        self.wave.reset_unpinned();
        self.queue.clear();
        self.queued.fill(false);
        Ok(SolverPhase::Seeding)
    }

    fn random_rule(&self, cell: CellId, rng: &mut dyn TileRng) -> RuleId {
        let pick = rng.next_usize_max(self.wave.count(cell));
        self.wave.iter_rules(cell).nth(pick).unwrap_or_default()
    }

    fn enqueue(&mut self, cell: CellId) {
        if !self.queued[cell] && !self.wave.is_pinned(cell) {
            self.queued[cell] = true;
            self.queue.push_back(cell);
        }
    }

    fn enqueue_unresolved_neighbors(&mut self, cell: CellId) {
        let graph = self.graph;
        for (_, slot) in graph.neighbors(cell) {
            if self.wave.count(slot.cell) > 1 {
                self.enqueue(slot.cell);
            }
        }
    }
}

/// Narrow cell domains (or pin cells) on open sides.
fn apply_border(
    wave: &mut PossibilityWave,
    graph: &CellGraph,
    catalog: &RuleCatalog,
    policy: BorderPolicy,
) -> Result<(), SolveError> {
    if policy == BorderPolicy::Open {
        return Ok(());
    }
    let fallback = catalog.fallback().ok_or(SolveError::MissingFallback)?;

    match policy {
        BorderPolicy::Open => {}
        BorderPolicy::PinFallback => {
            for (id, cell) in graph.cells().iter().enumerate() {
                if cell.degree() < 4 {
                    wave.pin(id, fallback.id());
                }
            }
        }
        BorderPolicy::MatchFallbackEdge => {
            let masks: Vec<BitVec> = Side::ALL
                .iter()
                .map(|side| {
                    let facing = fallback.side(side.opposite());
                    catalog
                        .rules()
                        .iter()
                        .map(|rule| rule.side(*side) == facing)
                        .collect()
                })
                .collect();
            for (id, cell) in graph.cells().iter().enumerate() {
                for side in Side::ALL {
                    if cell.neighbor(side).is_none() {
                        wave.restrict_domain(id, masks[side.index()].clone());
                    }
                }
            }
        }
    }
    Ok(())
}

/// The solved mapping from cell to rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    rules: Vec<RuleId>,
    nodes: Vec<Option<NodeId>>,
}

impl Assignment {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, cell: CellId) -> RuleId {
        self.rules[cell]
    }

    pub fn get(&self, cell: CellId) -> Option<RuleId> {
        self.rules.get(cell).copied()
    }

    pub fn rules(&self) -> &[RuleId] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, RuleId)> + '_ {
        self.rules.iter().copied().enumerate()
    }

    /// Rule per source topology node, for cells built from a mesh.
    pub fn by_node(&self) -> HashMap<NodeId, RuleId> {
        self.nodes
            .iter()
            .zip(&self.rules)
            .filter_map(|(node, rule)| node.map(|n| (n, *rule)))
            .collect()
    }

    /// Slots whose touching sides disagree, as `(cell, side)`.
    pub fn violations(&self, graph: &CellGraph, catalog: &RuleCatalog) -> Vec<(CellId, Side)> {
        let mut out = Vec::new();
        for (cell, rule) in self.iter() {
            let ours = catalog.rule(rule);
            for (side, slot) in graph.neighbors(cell) {
                let theirs = catalog.rule(self.rules[slot.cell]);
                let facing = slot.adapter.read_side(theirs.logical(), side.opposite());
                if !sides_compatible(&ours.side(side), &facing) {
                    out.push((cell, side));
                }
            }
        }
        out
    }

    /// True when every linked pair of cells agrees on its shared side.
    pub fn verify(&self, graph: &CellGraph, catalog: &RuleCatalog) -> bool {
        self.violations(graph, catalog).is_empty()
    }
}

/// Solve `graph` with a fresh solver seeded from `config.seed`.
pub fn solve(
    graph: &CellGraph,
    catalog: &RuleCatalog,
    config: &SolverConfig,
) -> Result<(Assignment, SolveStats), SolveError> {
    let mut rng = StdRandom::from_u64_seed(config.seed);
    let mut solver = Solver::new(graph, catalog, config.clone())?;
    let assignment = solver.run(&mut rng)?;
    Ok((assignment, solver.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ColorGrid, Rgba, Rule};
    use crate::wfc::observer::{EventLog, SolveEvent};

    const R: Rgba = [255, 0, 0, 255];
    const G: Rgba = [0, 255, 0, 255];
    const B: Rgba = [0, 0, 255, 255];

    fn solid(color: Rgba) -> Rule {
        Rule::new(ColorGrid::filled(2, color), ColorGrid::filled(4, color))
    }

    fn solids() -> RuleCatalog {
        RuleCatalog::from_rules(vec![solid(R), solid(G), solid(B).with_name("blank")])
            .unwrap()
            .with_fallback("blank")
    }

    #[test]
    fn test_line_resolves_to_one_color() {
        let graph = CellGraph::grid(5, 1);
        let catalog = solids();
        let (assignment, stats) = solve(&graph, &catalog, &SolverConfig::default()).unwrap();
        assert!(assignment.verify(&graph, &catalog));
        let first = assignment.rule(0);
        assert!(assignment.iter().all(|(_, r)| r == first));
        assert_eq!(stats.resets, 0);
    }

    #[test]
    fn test_pin_spreads() {
        let graph = CellGraph::grid(3, 3);
        let catalog = solids();
        let mut solver = Solver::new(&graph, &catalog, SolverConfig::default()).unwrap();
        solver.pin(4, 1).unwrap();
        assert_eq!(solver.cell_state(4), CellState::Pinned);

        let assignment = solver.run(&mut StdRandom::from_u64_seed(3)).unwrap();
        assert!(assignment.iter().all(|(_, r)| r == 1));
        assert_eq!(solver.stats().collapses, 0);
    }

    #[test]
    fn test_pin_validation() {
        let graph = CellGraph::grid(2, 1);
        let catalog = solids();
        let mut solver = Solver::new(&graph, &catalog, SolverConfig::default()).unwrap();
        assert_eq!(
            solver.pin(5, 0),
            Err(SolveError::InvalidPin { cell: 5, rule: 0 })
        );
        assert_eq!(
            solver.pin(0, 9),
            Err(SolveError::InvalidPin { cell: 0, rule: 9 })
        );

        solver.step(&mut StdRandom::from_u64_seed(0)).unwrap();
        assert_eq!(solver.pin(0, 0), Err(SolveError::AlreadyStarted));
    }

    #[test]
    fn test_step_walks_phases() {
        let graph = CellGraph::grid(2, 1);
        let catalog = solids();
        let mut solver = Solver::new(&graph, &catalog, SolverConfig::default()).unwrap();
        let mut rng = StdRandom::from_u64_seed(11);
        let mut log = EventLog::new();

        assert_eq!(solver.phase(), SolverPhase::Seeding);
        assert_eq!(solver.step_with(&mut rng, &mut log).unwrap(), SolverPhase::Propagating);
        assert_eq!(solver.queued_cells().len(), 1);
        assert!(matches!(log.events[0], SolveEvent::Seed { .. }));

        // The neighbour narrows to the seeded color
        assert_eq!(solver.step_with(&mut rng, &mut log).unwrap(), SolverPhase::Propagating);
        assert!(solver.queued_cells().is_empty());
        assert_eq!(solver.step_with(&mut rng, &mut log).unwrap(), SolverPhase::Selecting);
        assert_eq!(solver.step_with(&mut rng, &mut log).unwrap(), SolverPhase::Done);
        assert_eq!(solver.step(&mut rng).unwrap(), SolverPhase::Done);
        assert!(solver.assignment().is_some());
    }

    #[test]
    fn test_cancel_flag() {
        let graph = CellGraph::grid(4, 4);
        let catalog = solids();
        let mut solver = Solver::new(&graph, &catalog, SolverConfig::default()).unwrap();
        solver.cancel_flag().store(true, Ordering::Relaxed);
        assert_eq!(
            solver.run(&mut StdRandom::from_u64_seed(0)),
            Err(SolveError::Cancelled)
        );
    }

    #[test]
    fn test_step_budget() {
        let graph = CellGraph::grid(4, 4);
        let catalog = solids();
        let config = SolverConfig {
            max_steps: Some(3),
            ..Default::default()
        };
        let mut solver = Solver::new(&graph, &catalog, config).unwrap();
        assert_eq!(
            solver.run(&mut StdRandom::from_u64_seed(0)),
            Err(SolveError::Exhausted { steps: 3 })
        );
    }

    #[test]
    fn test_pin_fallback_border() {
        let graph = CellGraph::grid(3, 3);
        let catalog = solids();
        let config = SolverConfig::default().with_border(BorderPolicy::PinFallback);
        let (assignment, _) = solve(&graph, &catalog, &config).unwrap();
        // Only the centre has four neighbours; the pins force it to match
        assert!(assignment.iter().all(|(_, r)| r == 2));
    }

    #[test]
    fn test_match_fallback_edge_border() {
        let graph = CellGraph::grid(2, 2);
        let catalog = solids();
        let config = SolverConfig::default().with_border(BorderPolicy::MatchFallbackEdge);
        let (assignment, _) = solve(&graph, &catalog, &config).unwrap();
        assert!(assignment.iter().all(|(_, r)| r == 2));
    }

    #[test]
    fn test_border_needs_fallback() {
        let graph = CellGraph::grid(2, 2);
        let catalog = RuleCatalog::from_rules(vec![solid(R)]).unwrap();
        let config = SolverConfig::default().with_border(BorderPolicy::PinFallback);
        assert!(matches!(
            Solver::new(&graph, &catalog, config),
            Err(SolveError::MissingFallback)
        ));
    }

    #[test]
    fn test_adjacent_pins_must_agree() {
        let graph = CellGraph::grid(2, 1);
        let catalog = solids();
        let mut solver = Solver::new(&graph, &catalog, SolverConfig::default()).unwrap();
        solver.pin_all([(0, 0), (1, 1)]).unwrap();

        let result = solver.run(&mut StdRandom::from_u64_seed(0));
        assert_eq!(
            result,
            Err(SolveError::ConflictingPins {
                cell: 0,
                side: Side::Right
            })
        );
    }

    #[test]
    fn test_agreeing_pins_solve() {
        let graph = CellGraph::grid(3, 1);
        let catalog = solids();
        let mut solver = Solver::new(&graph, &catalog, SolverConfig::default()).unwrap();
        solver.pin_all([(0, 2), (1, 2)]).unwrap();

        let assignment = solver.run(&mut StdRandom::from_u64_seed(0)).unwrap();
        assert!(assignment.verify(&graph, &catalog));
        assert_eq!(assignment.rule(2), 2);
    }

    #[test]
    fn test_pinned_fallback_must_match_itself() {
        // Red left column, green right column: never matches itself left to right
        let split = Rule::new(
            ColorGrid::from_fn(2, |x, _| if x == 0 { R } else { G }),
            ColorGrid::filled(4, R),
        )
        .with_name("blank");
        let catalog = RuleCatalog::from_rules(vec![split, solid(B)])
            .unwrap()
            .with_fallback("blank");
        let graph = CellGraph::grid(3, 1);
        let config = SolverConfig::default().with_border(BorderPolicy::PinFallback);

        assert_eq!(
            Solver::new(&graph, &catalog, config).err(),
            Some(SolveError::ConflictingPins {
                cell: 0,
                side: Side::Right
            })
        );
    }

    #[test]
    fn test_all_excluded_is_empty() {
        let graph = CellGraph::grid(1, 1);
        let catalog = RuleCatalog::from_rules(vec![solid(R).with_tag("decal")])
            .unwrap()
            .with_excluded("decal");
        assert!(matches!(
            Solver::new(&graph, &catalog, SolverConfig::default()),
            Err(SolveError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_by_node_skips_abstract_cells() {
        let graph = CellGraph::grid(2, 1);
        let (assignment, _) = solve(&graph, &solids(), &SolverConfig::default()).unwrap();
        assert!(assignment.by_node().is_empty());
        assert_eq!(assignment.len(), 2);
    }
}
