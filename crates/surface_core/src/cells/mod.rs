//! The cell graph the solver runs on.
//!
//! Every quad face of the topology graph becomes a [`Cell`] with exactly four
//! side slots (bottom, left, top, right in the cell's own frame). Each
//! populated slot records which neighbour side touches it and carries the
//! [`FrameAdapter`] needed to read that neighbour's rules in our frame.
//!
//! Corner labels come either from the face's UVs (the default: the labelling
//! whose bottom-left corner sits lowest-left in texture space) or straight
//! from face vertex order. Non-quad faces are skipped and leave empty slots
//! on their neighbours.

pub mod adapter;

pub use adapter::FrameAdapter;

use crate::config::{CellGraphConfig, FrameSource};
use crate::mesh::{MeshFace, SurfaceMesh};
use crate::rules::Side;
use crate::topology::{islands, NodeId, PositionKey, TopologyError, TopologyGraph};
use bevy_log::{debug, warn};
use bevy_math::Vec2;
use std::fmt;

/// Index of a cell in its [`CellGraph`].
pub type CellId = usize;

/// Corner labels: bottom-left, bottom-right, top-right, top-left.
pub const BL: usize = 0;
pub const BR: usize = 1;
pub const TR: usize = 2;
pub const TL: usize = 3;

/// `(start, end)` corners of each side, indexed by [`Side::index`].
/// Sides run along ascending grid coordinates.
const SIDE_CORNERS: [(usize, usize); 4] = [(BL, BR), (BL, TL), (TL, TR), (BR, TR)];

/// Direction of each corner label away from the cell centre.
const CORNER_DIRS: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(-1.0, 1.0),
];

#[derive(Debug, Clone, PartialEq)]
pub enum CellGraphError {
    Topology(TopologyError),
    /// The slot was already linked.
    SlotOccupied { cell: CellId, side: Side },
    UnknownCell(CellId),
    SelfLink(CellId),
}

impl fmt::Display for CellGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellGraphError::Topology(e) => write!(f, "{}", e),
            CellGraphError::SlotOccupied { cell, side } => {
                write!(f, "cell {} already has a neighbour on {:?}", cell, side)
            }
            CellGraphError::UnknownCell(id) => write!(f, "unknown cell {}", id),
            CellGraphError::SelfLink(id) => write!(f, "cell {} cannot neighbour itself", id),
        }
    }
}

impl std::error::Error for CellGraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CellGraphError::Topology(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TopologyError> for CellGraphError {
    fn from(e: TopologyError) -> Self {
        CellGraphError::Topology(e)
    }
}

/// A populated side slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborSlot {
    pub cell: CellId,
    /// The neighbour's side that touches us, in its own frame.
    pub side: Side,
    /// The two sides run in opposite directions along the shared edge.
    pub reversed: bool,
    pub adapter: FrameAdapter,
}

#[derive(Debug, Clone)]
pub struct Cell {
    /// Source topology node, if the cell came from a mesh.
    pub node: Option<NodeId>,
    /// UV corners in label order (BL, BR, TR, TL).
    pub corners: [Vec2; 4],
    /// Slots indexed by [`Side::index`].
    pub neighbors: [Option<NeighborSlot>; 4],
    /// UV island id, when known.
    pub island: Option<usize>,
}

impl Cell {
    fn detached(node: Option<NodeId>, corners: [Vec2; 4]) -> Self {
        Self {
            node,
            corners,
            neighbors: [None; 4],
            island: None,
        }
    }

    pub fn neighbor(&self, side: Side) -> Option<&NeighborSlot> {
        self.neighbors[side.index()].as_ref()
    }

    pub fn degree(&self) -> usize {
        self.neighbors.iter().filter(|n| n.is_some()).count()
    }
}

/// Cells in an arena, indexed by [`CellId`].
#[derive(Debug, Clone, Default)]
pub struct CellGraph {
    cells: Vec<Cell>,
    by_node: Vec<Option<CellId>>,
}

impl CellGraph {
    pub fn builder() -> CellGraphBuilder {
        CellGraphBuilder::default()
    }

    /// A `width x height` grid of aligned cells, row-major from the bottom row.
    pub fn grid(width: usize, height: usize) -> CellGraph {
        let mut builder = Self::builder();
        for y in 0..height {
            for x in 0..width {
                let (fx, fy) = (x as f32 / width as f32, y as f32 / height as f32);
                let (dx, dy) = (1.0 / width as f32, 1.0 / height as f32);
                builder.add_cell_with_corners([
                    Vec2::new(fx, fy),
                    Vec2::new(fx + dx, fy),
                    Vec2::new(fx + dx, fy + dy),
                    Vec2::new(fx, fy + dy),
                ]);
            }
        }
        for y in 0..height {
            for x in 0..width {
                let id = x + y * width;
                if x + 1 < width {
                    builder.fill(id, Side::Right, id + 1, Side::Left, false);
                }
                if y + 1 < height {
                    builder.fill(id, Side::Top, id + width, Side::Bottom, false);
                }
            }
        }
        builder.build()
    }

    /// Build a cell graph over the faces of `mesh`, linked by position.
    pub fn from_mesh(mesh: &SurfaceMesh, config: &CellGraphConfig) -> Result<Self, CellGraphError> {
        let topology = TopologyGraph::build(mesh, config.quantum)?;
        Self::from_topology(&topology, config)
    }

    pub fn from_topology(
        topology: &TopologyGraph,
        config: &CellGraphConfig,
    ) -> Result<Self, CellGraphError> {
        let mut by_node = vec![None; topology.len()];
        let mut cells = Vec::new();
        let mut orders: Vec<[usize; 4]> = Vec::new();
        let mut nodes: Vec<NodeId> = Vec::new();

        for (id, node) in topology.nodes().iter().enumerate() {
            if !node.face.is_quad() {
                warn!(
                    "face {} has {} corners, only quads become cells",
                    id,
                    node.face.len()
                );
                continue;
            }
            let order = match config.frame {
                FrameSource::FaceOrder => [0, 1, 2, 3],
                FrameSource::Uv => uv_corner_order(&node.face),
            };
            by_node[id] = Some(cells.len());
            cells.push(Cell::detached(
                Some(id),
                order.map(|v| node.face.vertices[v].uv),
            ));
            orders.push(order);
            nodes.push(id);
        }

        for a in 0..cells.len() {
            let node_a = nodes[a];
            let keys_a = &topology.node(node_a).keys;

            for side in Side::ALL {
                let (start, end) = SIDE_CORNERS[side.index()];
                let (va, vb) = (orders[a][start], orders[a][end]);
                let edge = if vb == (va + 1) % 4 { va } else { vb };

                let Some(node_b) = topology.neighbor(node_a, edge) else {
                    continue;
                };
                let Some(b) = by_node[node_b] else {
                    continue;
                };

                let keys_b = &topology.node(node_b).keys;
                let (theirs, reversed) = match_side(keys_b, &orders[b], keys_a[va], keys_a[vb])
                    .ok_or(TopologyError::NoSharedEdge {
                        a: node_a,
                        b: node_b,
                    })?;

                cells[a].neighbors[side.index()] = Some(NeighborSlot {
                    cell: b,
                    side: theirs,
                    reversed,
                    adapter: FrameAdapter::from_sides(side, theirs, reversed),
                });
            }
        }

        let graph = Self { cells, by_node };
        debug!(
            "cell graph: {} cells, {} links",
            graph.len(),
            graph.link_count()
        );
        Ok(graph)
    }

    /// Tag cells with island ids from a UV-linked topology over the same mesh.
    pub fn with_islands(mut self, uv_topology: &TopologyGraph) -> Self {
        let ids = islands(uv_topology);
        for cell in &mut self.cells {
            cell.island = cell.node.and_then(|n| ids.get(n).copied());
        }
        self
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_for_node(&self, node: NodeId) -> Option<CellId> {
        self.by_node.get(node).copied().flatten()
    }

    /// Populated slots of `id` with the side they sit on.
    pub fn neighbors(&self, id: CellId) -> impl Iterator<Item = (Side, &NeighborSlot)> + '_ {
        self.cells[id]
            .neighbors
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (Side::from_index(i), s)))
    }

    pub fn link_count(&self) -> usize {
        self.cells.iter().map(Cell::degree).sum::<usize>() / 2
    }
}

/// Assemble abstract cell graphs by hand.
#[derive(Debug, Default)]
pub struct CellGraphBuilder {
    cells: Vec<Cell>,
}

impl CellGraphBuilder {
    /// Add a cell covering the unit UV square.
    pub fn add_cell(&mut self) -> CellId {
        self.add_cell_with_corners([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
    }

    pub fn add_cell_with_corners(&mut self, corners: [Vec2; 4]) -> CellId {
        self.cells.push(Cell::detached(None, corners));
        self.cells.len() - 1
    }

    /// Join `side_a` of `a` to `side_b` of `b`, filling both slots.
    pub fn link(
        &mut self,
        a: CellId,
        side_a: Side,
        b: CellId,
        side_b: Side,
        reversed: bool,
    ) -> Result<&mut Self, CellGraphError> {
        for id in [a, b] {
            if id >= self.cells.len() {
                return Err(CellGraphError::UnknownCell(id));
            }
        }
        if a == b {
            return Err(CellGraphError::SelfLink(a));
        }
        for (id, side) in [(a, side_a), (b, side_b)] {
            if self.cells[id].neighbors[side.index()].is_some() {
                return Err(CellGraphError::SlotOccupied { cell: id, side });
            }
        }

        self.fill(a, side_a, b, side_b, reversed);
        Ok(self)
    }

    /// Write both slots of a link already known to be valid.
    fn fill(&mut self, a: CellId, side_a: Side, b: CellId, side_b: Side, reversed: bool) {
        self.cells[a].neighbors[side_a.index()] = Some(NeighborSlot {
            cell: b,
            side: side_b,
            reversed,
            adapter: FrameAdapter::from_sides(side_a, side_b, reversed),
        });
        self.cells[b].neighbors[side_b.index()] = Some(NeighborSlot {
            cell: a,
            side: side_a,
            reversed,
            adapter: FrameAdapter::from_sides(side_b, side_a, reversed),
        });
    }

    pub fn build(self) -> CellGraph {
        CellGraph {
            cells: self.cells,
            by_node: Vec::new(),
        }
    }
}

/// Pick corner labels from UVs: try all 8 cyclic labellings and keep the one
/// whose corners point furthest toward their label's direction.
fn uv_corner_order(face: &MeshFace) -> [usize; 4] {
    let centroid = face.uv_centroid();
    let mut best = [0, 1, 2, 3];
    let mut best_score = f32::NEG_INFINITY;

    for mirrored in [false, true] {
        for r in 0..4 {
            let order: [usize; 4] = std::array::from_fn(|label| {
                if mirrored {
                    (r + 4 - label) % 4
                } else {
                    (r + label) % 4
                }
            });
            let score: f32 = order
                .iter()
                .zip(CORNER_DIRS)
                .map(|(v, dir)| (face.vertices[*v].uv - centroid).dot(dir))
                .sum();
            if score > best_score {
                best_score = score;
                best = order;
            }
        }
    }
    best
}

/// Find the side of a neighbour whose corners are `start`/`end`, in either direction.
fn match_side(
    keys: &[PositionKey],
    order: &[usize; 4],
    start: PositionKey,
    end: PositionKey,
) -> Option<(Side, bool)> {
    Side::ALL.into_iter().find_map(|side| {
        let (s, e) = SIDE_CORNERS[side.index()];
        let pair = (keys[order[s]], keys[order[e]]);
        if pair == (start, end) {
            Some((side, false))
        } else if pair == (end, start) {
            Some((side, true))
        } else {
            None
        }
    })
}
