use surface_core::config::{CellGraphConfig, FrameSource, SolverConfig};
use surface_core::wfc::EventLog;
use surface_core::{
    solve, CellGraph, ColorGrid, Rgba, Rule, RuleCatalog, Side, SolveError, Solver, StdRandom,
    SurfaceMesh,
};

const W: Rgba = [255, 255, 255, 255];
const R: Rgba = [255, 0, 0, 255];
const G: Rgba = [0, 255, 0, 255];

/// White border, colored centre: every side of every such rule reads all white.
fn framed(center: Rgba) -> Rule {
    let logical = ColorGrid::from_fn(3, |x, y| if (x, y) == (1, 1) { center } else { W });
    Rule::new(logical, ColorGrid::filled(6, center))
}

/// Left column `left`, right column `right`.
fn split(left: Rgba, right: Rgba) -> Rule {
    let logical = ColorGrid::from_fn(2, |x, _| if x == 0 { left } else { right });
    Rule::new(logical, ColorGrid::filled(4, left))
}

/// Cells linked right-to-left around a cycle of `len`.
fn ring(len: usize) -> CellGraph {
    let mut builder = CellGraph::builder();
    let cells: Vec<usize> = (0..len).map(|_| builder.add_cell()).collect();
    for i in 0..len {
        builder
            .link(cells[i], Side::Right, cells[(i + 1) % len], Side::Left, false)
            .unwrap();
    }
    builder.build()
}

#[test]
fn test_compatible_pair_on_small_grid() {
    let graph = CellGraph::grid(2, 2);
    assert!(graph.cells().iter().all(|c| c.degree() == 2));
    let catalog = RuleCatalog::from_rules(vec![framed(R), framed(G)]).unwrap();

    for seed in 0..8 {
        let config = SolverConfig::default().with_seed(seed);
        let (assignment, stats) = solve(&graph, &catalog, &config).unwrap();
        assert_eq!(stats.resets, 0);
        assert_eq!(assignment.len(), 4);
        assert!(assignment.verify(&graph, &catalog));
    }
}

#[test]
fn test_single_rule_fills_any_graph() {
    let catalog = RuleCatalog::from_rules(vec![framed(R)]).unwrap();
    let cube = CellGraph::from_mesh(
        &SurfaceMesh::subdivided_cube(1.0, 2),
        &CellGraphConfig {
            frame: FrameSource::FaceOrder,
            ..Default::default()
        },
    )
    .unwrap();

    for graph in [CellGraph::grid(3, 3), ring(3), ring(5), cube] {
        let (assignment, stats) = solve(&graph, &catalog, &SolverConfig::default()).unwrap();
        assert!(assignment.iter().all(|(_, rule)| rule == 0));
        assert_eq!(stats.resets, 0);
    }
}

#[test]
fn test_lone_cell_resolves_without_propagation() {
    let mut builder = CellGraph::builder();
    builder.add_cell();
    let graph = builder.build();
    let catalog = RuleCatalog::from_rules(vec![framed(R), framed(G)]).unwrap();

    let mut solver = Solver::new(&graph, &catalog, SolverConfig::default()).unwrap();
    let assignment = solver.run(&mut StdRandom::from_u64_seed(4)).unwrap();

    assert_eq!(assignment.len(), 1);
    assert_eq!(solver.stats().propagations, 0);
    assert_eq!(solver.stats().collapses, 0);
    assert_eq!(solver.stats().resets, 0);
}

#[test]
fn test_odd_cycle_of_alternating_rules_is_unsolvable() {
    // Right side of one rule only matches the left side of the other
    let catalog = RuleCatalog::from_rules(vec![split(R, G), split(G, R)]).unwrap();
    let graph = ring(3);
    let config = SolverConfig {
        max_resets: Some(5),
        ..Default::default()
    };

    let mut solver = Solver::new(&graph, &catalog, config).unwrap();
    let mut log = EventLog::new();
    let result = solver.run_with(&mut StdRandom::from_u64_seed(1), &mut log);

    assert_eq!(result, Err(SolveError::Unsolvable { resets: 5 }));
    assert_eq!(log.resets(), 5);
    assert!(solver.stats().resets >= 1);
}

#[test]
fn test_even_cycle_of_alternating_rules_solves() {
    let catalog = RuleCatalog::from_rules(vec![split(R, G), split(G, R)]).unwrap();
    let graph = ring(4);
    let (assignment, stats) = solve(&graph, &catalog, &SolverConfig::default()).unwrap();

    assert!(assignment.verify(&graph, &catalog));
    assert_eq!(stats.resets, 0);
    assert_ne!(assignment.rule(0), assignment.rule(1));
    assert_eq!(assignment.rule(0), assignment.rule(2));
}

#[test]
fn test_default_reset_budget() {
    let catalog = RuleCatalog::from_rules(vec![split(R, G), split(G, R)]).unwrap();
    let result = solve(&ring(3), &catalog, &SolverConfig::default());
    assert_eq!(result.err(), Some(SolveError::Unsolvable { resets: 256 }));
}
