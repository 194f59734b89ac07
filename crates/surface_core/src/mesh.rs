//! Input mesh types for the surface pipeline.
//!
//! A `SurfaceMesh` is an ordered list of polygon faces. Faces never share
//! vertex objects: adjacency is recovered later from vertex *positions*
//! (see [`crate::topology`]), so every face carries its own copies.
//!
//! Only positions and UVs matter to the core. Normals are kept so callers
//! can round-trip their engine data, but nothing here reads them.
//!
//! # Example
//!
//! ```ignore
//! use surface_core::mesh::SurfaceMesh;
//!
//! // 4x4 quads on each side of a 2-unit cube, sides laid out in a 3x2 UV atlas
//! let mesh = SurfaceMesh::subdivided_cube(2.0, 4);
//! assert_eq!(mesh.len(), 6 * 16);
//! ```

use bevy_math::{Vec2, Vec3};

/// A single face corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl MeshVertex {
    /// Create a vertex with a zero normal.
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
            uv,
        }
    }

    /// Create a vertex with an explicit normal.
    pub fn with_normal(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// An ordered polygon. Edge `i` runs from vertex `i` to vertex `i + 1` (wrapping).
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFace {
    pub vertices: Vec<MeshVertex>,
}

impl MeshFace {
    pub fn new(vertices: Vec<MeshVertex>) -> Self {
        Self { vertices }
    }

    /// Number of corners (and edges).
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_quad(&self) -> bool {
        self.vertices.len() == 4
    }

    /// Endpoints of edge `i`.
    pub fn edge(&self, i: usize) -> (&MeshVertex, &MeshVertex) {
        let n = self.vertices.len();
        (&self.vertices[i % n], &self.vertices[(i + 1) % n])
    }

    /// Centroid of the face in UV space.
    pub fn uv_centroid(&self) -> Vec2 {
        if self.vertices.is_empty() {
            return Vec2::ZERO;
        }
        let sum: Vec2 = self.vertices.iter().map(|v| v.uv).sum();
        sum / self.vertices.len() as f32
    }
}

/// A polygon soup with per-face vertex copies.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub faces: Vec<MeshFace>,
}

/// Cube side frames: (origin corner in unit-cube coordinates, u axis, v axis).
/// `u x v` is the outward normal, so every side winds counter-clockwise.
const CUBE_SIDES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    // +X
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    // -X
    ([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    // +Y
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
    // -Y
    ([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    // +Z
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    // -Z
    ([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
];

impl SurfaceMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_faces(faces: Vec<MeshFace>) -> Self {
        Self { faces }
    }

    pub fn push_face(&mut self, face: MeshFace) {
        self.faces.push(face);
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// A flat `width x height` grid of quads in the XY plane.
    ///
    /// UVs span `[0, 1]` across the whole grid, so the grid is a single island.
    pub fn quad_grid(width: usize, height: usize, cell_size: f32) -> Self {
        let mut faces = Vec::with_capacity(width * height);
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;

        let corner = |x: usize, y: usize| {
            MeshVertex::with_normal(
                Vec3::new(x as f32 * cell_size, y as f32 * cell_size, 0.0),
                Vec3::Z,
                Vec2::new(x as f32 / w, y as f32 / h),
            )
        };

        for y in 0..height {
            for x in 0..width {
                faces.push(MeshFace::new(vec![
                    corner(x, y),
                    corner(x + 1, y),
                    corner(x + 1, y + 1),
                    corner(x, y + 1),
                ]));
            }
        }

        Self { faces }
    }

    /// A cube with one quad per side, each side mapped to the full `[0, 1]` UV square.
    pub fn cube(size: f32) -> Self {
        let mut mesh = Self::subdivided_cube(size, 1);
        let uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        for face in &mut mesh.faces {
            for (v, uv) in face.vertices.iter_mut().zip(uvs) {
                v.uv = uv;
            }
        }
        mesh
    }

    /// A cube centered on the origin whose sides are split into `n x n` quads.
    ///
    /// Each side is its own UV island, placed in a 3x2 atlas: side `s` covers
    /// column `s % 3`, row `s / 3`. Sides disagree about their local axes
    /// where they meet, which is exactly what frame adapters reconcile.
    pub fn subdivided_cube(size: f32, n: usize) -> Self {
        let n = n.max(1);
        let half = size * 0.5;
        let mut faces = Vec::with_capacity(6 * n * n);

        for (side, (origin, u, v)) in CUBE_SIDES.iter().enumerate() {
            let origin = Vec3::from_array(*origin) * size - Vec3::splat(half);
            let u = Vec3::from_array(*u);
            let v = Vec3::from_array(*v);
            let normal = u.cross(v);
            let atlas = Vec2::new((side % 3) as f32 / 3.0, (side / 3) as f32 / 2.0);

            let corner = |i: usize, j: usize| {
                let s = i as f32 / n as f32;
                let t = j as f32 / n as f32;
                MeshVertex::with_normal(
                    origin + u * (s * size) + v * (t * size),
                    normal,
                    atlas + Vec2::new(s / 3.0, t / 2.0),
                )
            };

            for j in 0..n {
                for i in 0..n {
                    faces.push(MeshFace::new(vec![
                        corner(i, j),
                        corner(i + 1, j),
                        corner(i + 1, j + 1),
                        corner(i, j + 1),
                    ]));
                }
            }
        }

        Self { faces }
    }
}
