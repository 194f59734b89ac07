//! Wave Function Collapse over a cell graph.
//!
//! - [`possibility`]: per-cell rule bitsets
//! - [`compat`]: precomputed side-compatibility tables
//! - [`heuristic`]: which cell to collapse next
//! - [`observer`]: solve events and counters
//! - [`solver`]: the state machine tying them together

pub mod compat;
pub mod heuristic;
pub mod observer;
pub mod possibility;
pub mod solver;

pub use compat::Propagator;
pub use heuristic::{CollapseHeuristic, FewestPossibilities, MostPossibilities};
pub use observer::{EventLog, NoopObserver, SolveEvent, SolveObserver, SolveStats};
pub use possibility::PossibilityWave;
pub use solver::{solve, Assignment, CellState, SolveError, Solver, SolverPhase};
