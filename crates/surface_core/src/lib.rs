//! Core of Surface Studio: tile synthesis over mesh surfaces.
//!
//! This crate provides:
//! - Face adjacency graphs built from mesh geometry, with UV islands
//! - Rule catalogs sliced from paired logical/detailed sample images
//! - Cell graphs whose neighbour frames are reconciled by D4 adapters
//! - A Wave Function Collapse solver over arbitrary cell graphs
//! - A texture compositor for solved assignments
//!
//! Data flows one way:
//!
//! ```text
//! SurfaceMesh ─► TopologyGraph ─► CellGraph ─┐
//!                                            ├─► Solver ─► Assignment ─► paint_assignment
//! sample images ─► RuleCatalog ──────────────┘
//! ```

pub mod cells;
pub mod config;
pub mod mesh;
pub mod render;
pub mod rng;
pub mod rules;
pub mod topology;
pub mod wfc;

pub use cells::{Cell, CellGraph, CellGraphBuilder, CellGraphError, CellId, FrameAdapter, NeighborSlot};
pub use config::{
    BorderPolicy, CellGraphConfig, ConfigError, FrameSource, HeuristicKind, SolverConfig,
    SurfaceConfig,
};
pub use mesh::{MeshFace, MeshVertex, SurfaceMesh};
pub use render::{paint_assignment, save_png};
pub use rng::{StdRandom, TileRng};
pub use rules::{CatalogError, ColorGrid, Rgba, Rule, RuleCatalog, RuleId, Side};
pub use topology::{Linkage, NodeId, TopologyError, TopologyGraph};
pub use wfc::{
    solve, Assignment, CellState, CollapseHeuristic, EventLog, SolveError, SolveEvent,
    SolveObserver, SolveStats, Solver, SolverPhase,
};
