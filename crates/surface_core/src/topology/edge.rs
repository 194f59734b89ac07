//! Quantized geometry keys used for edge equality.
//!
//! Faces are built independently and never share vertex objects, so two
//! faces touch when their edge endpoints land on the same *positions*.
//! Float equality is brittle, so positions are snapped to an integer lattice
//! of step `quantum` first.

use bevy_math::{Vec2, Vec3};

/// A 3D position snapped to a lattice of step `quantum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey(pub [i64; 3]);

impl PositionKey {
    pub fn from_vec3(p: Vec3, quantum: f32) -> Self {
        Self([
            snap(p.x, quantum),
            snap(p.y, quantum),
            snap(p.z, quantum),
        ])
    }
}

/// A UV coordinate snapped to a lattice of step `quantum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UvKey(pub [i64; 2]);

impl UvKey {
    pub fn from_vec2(uv: Vec2, quantum: f32) -> Self {
        Self([snap(uv.x, quantum), snap(uv.y, quantum)])
    }
}

#[inline]
fn snap(value: f32, quantum: f32) -> i64 {
    (value as f64 / quantum as f64).round() as i64
}

/// An unordered pair of endpoint keys.
///
/// Endpoints are stored in canonical (sorted) order, so `EdgeKey::new(a, b)`
/// and `EdgeKey::new(b, a)` compare and hash equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey<K> {
    lo: K,
    hi: K,
}

impl<K: Ord + Copy> EdgeKey<K> {
    pub fn new(a: K, b: K) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_key_absorbs_float_noise() {
        let a = PositionKey::from_vec3(Vec3::new(0.1 + 0.2, 1.0, -2.0), 1e-4);
        let b = PositionKey::from_vec3(Vec3::new(0.3, 1.0, -2.0), 1e-4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_position_key_separates_distinct_points() {
        let a = PositionKey::from_vec3(Vec3::new(0.0, 0.0, 0.0), 1e-4);
        let b = PositionKey::from_vec3(Vec3::new(0.001, 0.0, 0.0), 1e-4);
        assert_ne!(a, b);
    }

    #[test]
    fn test_edge_key_is_unordered() {
        let p = PositionKey([0, 0, 0]);
        let q = PositionKey([1, 0, 0]);
        assert_eq!(EdgeKey::new(p, q), EdgeKey::new(q, p));
        assert_ne!(EdgeKey::new(p, q), EdgeKey::new(p, p));
    }

    #[test]
    fn test_edge_key_with_uv_component() {
        let p = PositionKey([0, 0, 0]);
        let q = PositionKey([1, 0, 0]);
        let seam_a = EdgeKey::new((p, UvKey([0, 0])), (q, UvKey([10, 0])));
        let seam_b = EdgeKey::new((p, UvKey([50, 0])), (q, UvKey([60, 0])));
        assert_ne!(seam_a, seam_b);
    }
}
