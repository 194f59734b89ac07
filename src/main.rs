//! Surface Studio demo.
//!
//! Solves a wire catalog over a subdivided cube and writes the painted
//! texture atlas to `surface_demo.png`.
//!
//! ```text
//! surface_studio [config.json] [catalog.json]
//! ```
//!
//! Without a catalog manifest a small wire catalog is synthesized in code.

use bevy_app::{App, Startup};
use bevy_ecs::prelude::*;
use bevy_log::{error, info, LogPlugin};
use std::path::{Path, PathBuf};
use surface_core::rules::load_manifest;
use surface_core::{
    paint_assignment, save_png, solve, CatalogError, CellGraph, CellGraphConfig, ColorGrid,
    ConfigError, FrameSource, Rgba, Rule, RuleCatalog, Side, SolverConfig, SurfaceConfig,
    SurfaceMesh,
};

const OUTPUT: &str = "surface_demo.png";
const TEXTURE_SIZE: u32 = 768;
const CUBE_DIVISIONS: usize = 6;

const BOARD: Rgba = [24, 56, 40, 255];
const COPPER: Rgba = [214, 142, 64, 255];
const LOGIC_OFF: Rgba = [255, 255, 255, 255];
const LOGIC_ON: Rgba = [0, 0, 0, 255];

/// Where the demo reads its catalog from and writes its texture to.
#[derive(Resource, Debug, Clone)]
struct DemoPaths {
    catalog: Option<PathBuf>,
    output: PathBuf,
}

fn main() {
    let mut args = std::env::args().skip(1);
    let mut app = App::new();
    app.add_plugins(LogPlugin::default());

    let config_path = args.next();
    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(
                "failed to load config {}: {}",
                config_path.unwrap_or_default(),
                e
            );
            return;
        }
    };

    app.insert_resource(config.solver)
        .insert_resource(config.cells)
        .insert_resource(DemoPaths {
            catalog: args.next().map(PathBuf::from),
            output: PathBuf::from(OUTPUT),
        })
        .add_systems(Startup, run_demo)
        .run();
}

/// Config from `path`, or the demo defaults when no path is given.
fn load_config(path: Option<&str>) -> Result<SurfaceConfig, ConfigError> {
    match path {
        Some(path) => SurfaceConfig::load(Path::new(path)),
        None => Ok(SurfaceConfig {
            cells: CellGraphConfig {
                // Face order keeps every cube side in its own frame, so the
                // seams between sides go through rotated adapters
                frame: FrameSource::FaceOrder,
                ..Default::default()
            },
            ..Default::default()
        }),
    }
}

fn run_demo(
    solver_config: Res<SolverConfig>,
    cell_config: Res<CellGraphConfig>,
    paths: Res<DemoPaths>,
) {
    let loaded = match &paths.catalog {
        Some(path) => load_manifest(path),
        None => wire_catalog(),
    };
    let catalog = match loaded {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("failed to load catalog: {}", e);
            return;
        }
    };

    let mesh = SurfaceMesh::subdivided_cube(2.0, CUBE_DIVISIONS);
    let graph = match CellGraph::from_mesh(&mesh, &cell_config) {
        Ok(graph) => graph,
        Err(e) => {
            error!("failed to build cell graph: {}", e);
            return;
        }
    };
    info!(
        "cube: {} faces, {} cells, {} links",
        mesh.len(),
        graph.len(),
        graph.link_count()
    );

    let (assignment, stats) = match solve(&graph, &catalog, &solver_config) {
        Ok(solved) => solved,
        Err(e) => {
            error!("solve failed: {}", e);
            return;
        }
    };
    info!(
        "stats: {} steps, {} collapses, {} propagations, {} resets",
        stats.steps, stats.collapses, stats.propagations, stats.resets
    );
    if !assignment.verify(&graph, &catalog) {
        error!(
            "solution disagrees on {} sides",
            assignment.violations(&graph, &catalog).len()
        );
    }

    let texture = paint_assignment(&graph, &catalog, &assignment, TEXTURE_SIZE, TEXTURE_SIZE);
    match save_png(&texture, &paths.output) {
        Ok(()) => info!("wrote {}", paths.output.display()),
        Err(e) => error!("failed to write {}: {}", paths.output.display(), e),
    }
}

/// One tile per subset of connected sides: a copper trace from the centre
/// out to every connected edge.
fn wire_catalog() -> Result<RuleCatalog, CatalogError> {
    let rules = (0u8..16)
        .map(|mask| {
            let connected = |side: Side| mask & (1 << side.index()) != 0;

            let logical = ColorGrid::from_fn(3, |x, y| {
                let lit = match (x, y) {
                    (1, 0) => connected(Side::Bottom),
                    (0, 1) => connected(Side::Left),
                    (1, 2) => connected(Side::Top),
                    (2, 1) => connected(Side::Right),
                    (1, 1) => mask != 0,
                    _ => false,
                };
                if lit {
                    LOGIC_ON
                } else {
                    LOGIC_OFF
                }
            });

            // 12px tile, 4px trace centred on each axis
            let detailed = ColorGrid::from_fn(12, |x, y| {
                let mid_x = (4..8).contains(&x);
                let mid_y = (4..8).contains(&y);
                let lit = (mid_x && mid_y && mask != 0)
                    || (mid_x && y < 4 && connected(Side::Bottom))
                    || (mid_x && y >= 8 && connected(Side::Top))
                    || (mid_y && x < 4 && connected(Side::Left))
                    || (mid_y && x >= 8 && connected(Side::Right));
                if lit {
                    COPPER
                } else {
                    BOARD
                }
            });

            let name = if mask == 0 {
                "blank".to_string()
            } else {
                format!("wire_{:04b}", mask)
            };
            Rule::new(logical, detailed).with_name(name)
        })
        .collect();

    Ok(RuleCatalog::from_rules(rules)?.with_fallback("blank"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_face_order() {
        let config = load_config(None).unwrap();
        assert_eq!(config.cells.frame, FrameSource::FaceOrder);
        assert_eq!(config.solver, SolverConfig::default());
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(matches!(
            load_config(path.to_str()),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_wire_catalog_has_blank_fallback() {
        let catalog = wire_catalog().unwrap();
        assert_eq!(catalog.len(), 16);
        assert_eq!(catalog.fallback_id(), catalog.find("blank"));
    }
}
