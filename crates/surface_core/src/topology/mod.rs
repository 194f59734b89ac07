//! Face adjacency graph built from mesh geometry.
//!
//! Every mesh face becomes a [`TopologyNode`]. Two nodes are neighbours when
//! their faces share an edge, compared by quantized endpoint positions (and,
//! for [`Linkage::Uv`], by UV as well). Neighbour slot `i` of a node always
//! refers to the face's own edge `i`, so "which edge do we share" is a slot
//! lookup rather than a search.
//!
//! ```text
//!   face A (edge 1) ──── shared edge ──── (edge 3) face B
//!   A.neighbors[1] == Some(B)             B.neighbors[3] == Some(A)
//! ```
//!
//! Adjacency discovery goes through an edge → (face, edge index) hash index,
//! which yields the same graph as comparing every pair of faces.

pub mod edge;
pub mod island;

pub use edge::{EdgeKey, PositionKey, UvKey};
pub use island::{island_count, island_members, islands};

use crate::mesh::{MeshFace, SurfaceMesh};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Index of a node in its [`TopologyGraph`]. Equal to the source face index.
pub type NodeId = usize;

/// Errors raised while building or querying the topology graph.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// The mesh cannot be turned into an unambiguous face graph.
    MalformedMesh { face: usize, reason: String },
    /// Two nodes were assumed to touch but share no edge.
    NoSharedEdge { a: NodeId, b: NodeId },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::MalformedMesh { face, reason } => {
                write!(f, "malformed mesh at face {}: {}", face, reason)
            }
            TopologyError::NoSharedEdge { a, b } => {
                write!(f, "nodes {} and {} share no edge", a, b)
            }
        }
    }
}

impl std::error::Error for TopologyError {}

/// What two faces must agree on to count as neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Shared edge endpoints in 3D position.
    Position,
    /// Shared edge endpoints in both position and UV. UV seams split faces apart,
    /// which is what groups faces into texture islands.
    Uv,
}

/// One face plus its per-edge neighbour slots.
#[derive(Debug, Clone)]
pub struct TopologyNode {
    pub face: MeshFace,
    /// `neighbors[i]` is the node across the face's edge `i`, if any.
    pub neighbors: Vec<Option<NodeId>>,
    /// Quantized corner positions, in face order.
    pub keys: Vec<PositionKey>,
}

impl TopologyNode {
    /// Number of populated neighbour slots.
    pub fn degree(&self) -> usize {
        self.neighbors.iter().filter(|n| n.is_some()).count()
    }

    /// Position key pair of edge `i`.
    pub fn edge_key(&self, i: usize) -> EdgeKey<PositionKey> {
        let n = self.keys.len();
        EdgeKey::new(self.keys[i % n], self.keys[(i + 1) % n])
    }
}

/// Undirected face adjacency graph with stable per-node neighbour ordering.
#[derive(Debug, Clone)]
pub struct TopologyGraph {
    nodes: Vec<TopologyNode>,
    linkage: Linkage,
    quantum: f32,
}

impl TopologyGraph {
    /// Link faces that share an edge in 3D position.
    pub fn build(mesh: &SurfaceMesh, quantum: f32) -> Result<Self, TopologyError> {
        Self::build_with(mesh, quantum, Linkage::Position)
    }

    /// Link faces that share an edge in both position and UV.
    pub fn build_uv(mesh: &SurfaceMesh, quantum: f32) -> Result<Self, TopologyError> {
        Self::build_with(mesh, quantum, Linkage::Uv)
    }

    pub fn build_with(
        mesh: &SurfaceMesh,
        quantum: f32,
        linkage: Linkage,
    ) -> Result<Self, TopologyError> {
        let mut keys = Vec::with_capacity(mesh.len());
        for (index, face) in mesh.faces.iter().enumerate() {
            keys.push(validate_face(index, face, quantum)?);
        }

        let neighbors = match linkage {
            Linkage::Position => {
                let edges: Vec<Vec<EdgeKey<PositionKey>>> = keys
                    .iter()
                    .map(|k| face_edges(k, |i| k[i]))
                    .collect();
                link_faces(&edges)?
            }
            Linkage::Uv => {
                let edges: Vec<Vec<EdgeKey<(PositionKey, UvKey)>>> = mesh
                    .faces
                    .iter()
                    .zip(&keys)
                    .map(|(face, k)| {
                        face_edges(k, |i| (k[i], UvKey::from_vec2(face.vertices[i].uv, quantum)))
                    })
                    .collect();
                link_faces(&edges)?
            }
        };

        let nodes = mesh
            .faces
            .iter()
            .zip(keys)
            .zip(neighbors)
            .map(|((face, keys), neighbors)| TopologyNode {
                face: face.clone(),
                neighbors,
                keys,
            })
            .collect();

        Ok(Self {
            nodes,
            linkage,
            quantum,
        })
    }

    pub fn nodes(&self) -> &[TopologyNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &TopologyNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    pub fn quantum(&self) -> f32 {
        self.quantum
    }

    /// Node across edge `edge` of `node`.
    pub fn neighbor(&self, node: NodeId, edge: usize) -> Option<NodeId> {
        self.nodes[node].neighbors.get(edge).copied().flatten()
    }

    /// Index (in `a`'s face) of the edge that `a` shares with `b`.
    pub fn shared_edge_index(&self, a: NodeId, b: NodeId) -> Result<usize, TopologyError> {
        self.nodes
            .get(a)
            .and_then(|node| node.neighbors.iter().position(|n| *n == Some(b)))
            .ok_or(TopologyError::NoSharedEdge { a, b })
    }

    /// Total number of undirected links.
    pub fn link_count(&self) -> usize {
        self.nodes.iter().map(TopologyNode::degree).sum::<usize>() / 2
    }
}

/// Reject faces the graph cannot represent unambiguously.
fn validate_face(
    index: usize,
    face: &MeshFace,
    quantum: f32,
) -> Result<Vec<PositionKey>, TopologyError> {
    if face.len() < 3 {
        return Err(TopologyError::MalformedMesh {
            face: index,
            reason: format!("face has {} vertices, need at least 3", face.len()),
        });
    }

    let keys: Vec<PositionKey> = face
        .vertices
        .iter()
        .map(|v| PositionKey::from_vec3(v.position, quantum))
        .collect();

    for i in 0..keys.len() {
        if keys[i + 1..].contains(&keys[i]) {
            return Err(TopologyError::MalformedMesh {
                face: index,
                reason: format!("corner {} shares its position with another corner", i),
            });
        }
    }

    Ok(keys)
}

fn face_edges<K, F>(corners: &[PositionKey], key: F) -> Vec<EdgeKey<K>>
where
    K: Ord + Copy,
    F: Fn(usize) -> K,
{
    let n = corners.len();
    (0..n).map(|i| EdgeKey::new(key(i), key((i + 1) % n))).collect()
}

/// Resolve per-edge neighbour slots from per-face edge keys.
fn link_faces<K>(edges: &[Vec<EdgeKey<K>>]) -> Result<Vec<Vec<Option<NodeId>>>, TopologyError>
where
    K: Ord + Copy + Hash,
{
    let mut index: HashMap<EdgeKey<K>, Vec<(NodeId, usize)>> = HashMap::new();
    for (face, face_edges) in edges.iter().enumerate() {
        for (slot, key) in face_edges.iter().enumerate() {
            index.entry(*key).or_default().push((face, slot));
        }
    }

    let mut neighbors: Vec<Vec<Option<NodeId>>> =
        edges.iter().map(|e| vec![None; e.len()]).collect();

    for users in index.values() {
        match users.as_slice() {
            [_] => {}
            [(a, slot_a), (b, slot_b)] => {
                if a == b {
                    return Err(TopologyError::MalformedMesh {
                        face: *a,
                        reason: "face uses the same edge twice".to_string(),
                    });
                }
                neighbors[*a][*slot_a] = Some(*b);
                neighbors[*b][*slot_b] = Some(*a);
            }
            _ => {
                let face = users.iter().map(|(f, _)| *f).min().unwrap_or(0);
                return Err(TopologyError::MalformedMesh {
                    face,
                    reason: format!("non-manifold edge shared by {} faces", users.len()),
                });
            }
        }
    }

    // Two faces may touch along one edge only.
    for (face, slots) in neighbors.iter().enumerate() {
        for (i, n) in slots.iter().enumerate() {
            if let Some(other) = n {
                if slots[i + 1..].contains(&Some(*other)) {
                    return Err(TopologyError::MalformedMesh {
                        face,
                        reason: format!("shares more than one edge with face {}", other),
                    });
                }
            }
        }
    }

    Ok(neighbors)
}
