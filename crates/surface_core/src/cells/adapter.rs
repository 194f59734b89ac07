//! Frame adapters between neighbouring cells.
//!
//! Each cell reads its rules in its own local frame. Where two UV islands
//! meet, the neighbour's frame is generally rotated or mirrored relative to
//! ours, so "the neighbour's side facing us" is not simply `side.opposite()`.
//!
//! A [`FrameAdapter`] is one of the 8 symmetries of the square (the D4 group,
//! same element set the grid rule symmetries enumerate). It maps a grid
//! coordinate in *our* frame, with the neighbour imagined unfolded across
//! the shared side, to the coordinate in the neighbour's own frame:
//!
//! ```text
//!   native = origin * (n - 1) + x * axis_x + y * axis_y
//! ```
//!
//! `origin` picks the neighbour corner that our `(0, 0)` lands on, and the
//! two axes are unit vectors in neighbour index space.

use crate::rules::{ColorGrid, Rgba, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameAdapter {
    /// Corner of the neighbour grid our `(0, 0)` maps to, as 0/1 per axis.
    origin: [u8; 2],
    axis_x: [i8; 2],
    axis_y: [i8; 2],
}

impl Default for FrameAdapter {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FrameAdapter {
    pub const IDENTITY: FrameAdapter = FrameAdapter {
        origin: [0, 0],
        axis_x: [1, 0],
        axis_y: [0, 1],
    };

    /// Build from two axis vectors; the origin follows from their signs.
    ///
    /// The axes must be distinct signed unit vectors.
    pub fn from_axes(axis_x: [i8; 2], axis_y: [i8; 2]) -> Self {
        debug_assert!(
            axis_x[0].abs() + axis_x[1].abs() == 1
                && axis_y[0].abs() + axis_y[1].abs() == 1
                && axis_x[0] * axis_y[0] + axis_x[1] * axis_y[1] == 0,
            "axes must be orthogonal unit vectors"
        );
        let origin = [
            u8::from(axis_x[0] < 0 || axis_y[0] < 0),
            u8::from(axis_x[1] < 0 || axis_y[1] < 0),
        ];
        Self {
            origin,
            axis_x,
            axis_y,
        }
    }

    /// All 8 square symmetries, identity first.
    pub fn all() -> [FrameAdapter; 8] {
        let mut out = [Self::IDENTITY; 8];
        let mut i = 0;
        for swap in [false, true] {
            for sx in [1i8, -1] {
                for sy in [1i8, -1] {
                    out[i] = if swap {
                        Self::from_axes([0, sx], [sy, 0])
                    } else {
                        Self::from_axes([sx, 0], [0, sy])
                    };
                    i += 1;
                }
            }
        }
        out
    }

    /// The adapter for a neighbour whose `neighbor_side` touches our `my_side`.
    ///
    /// `reversed` is true when the two sides run in opposite directions along
    /// the shared edge (their first samples sit at different ends).
    pub fn from_sides(my_side: Side, neighbor_side: Side, reversed: bool) -> Self {
        let facing = my_side.opposite();
        match Self::all()
            .into_iter()
            .find(|a| a.map_side(facing) == (neighbor_side, reversed))
        {
            Some(adapter) => adapter,
            None => {
                debug_assert!(false, "square symmetries cover every directed side");
                Self::IDENTITY
            }
        }
    }

    pub fn origin(&self) -> [u8; 2] {
        self.origin
    }

    pub fn axis_x(&self) -> [i8; 2] {
        self.axis_x
    }

    pub fn axis_y(&self) -> [i8; 2] {
        self.axis_y
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True when the transform flips handedness.
    pub fn is_mirrored(&self) -> bool {
        let det = self.axis_x[0] as i32 * self.axis_y[1] as i32
            - self.axis_x[1] as i32 * self.axis_y[0] as i32;
        det < 0
    }

    /// Map `(x, y)` of an `size x size` grid into neighbour coordinates.
    pub fn map_point(&self, x: usize, y: usize, size: usize) -> (usize, usize) {
        let last = size.saturating_sub(1) as i64;
        let (x, y) = (x as i64, y as i64);
        let nx = self.origin[0] as i64 * last + x * self.axis_x[0] as i64 + y * self.axis_y[0] as i64;
        let ny = self.origin[1] as i64 * last + x * self.axis_x[1] as i64 + y * self.axis_y[1] as i64;
        (nx as usize, ny as usize)
    }

    /// The neighbour side that our `side` lands on, and whether sample order flips.
    pub fn map_side(&self, side: Side) -> (Side, bool) {
        let (x0, y0) = side.coords(2, 0);
        let (x1, y1) = side.coords(2, 1);
        let a = self.map_point(x0, y0, 2);
        let b = self.map_point(x1, y1, 2);

        for candidate in Side::ALL {
            let start = candidate.coords(2, 0);
            let end = candidate.coords(2, 1);
            if (start, end) == (a, b) {
                return (candidate, false);
            }
            if (start, end) == (b, a) {
                return (candidate, true);
            }
        }
        // A square symmetry always maps a side onto a side.
        (side, false)
    }

    /// The transform taking neighbour coordinates back into ours.
    pub fn inverse(&self) -> Self {
        Self::from_axes(
            [self.axis_x[0], self.axis_y[0]],
            [self.axis_x[1], self.axis_y[1]],
        )
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &FrameAdapter) -> Self {
        let apply = |v: [i8; 2]| {
            [
                v[0] * next.axis_x[0] + v[1] * next.axis_y[0],
                v[0] * next.axis_x[1] + v[1] * next.axis_y[1],
            ]
        };
        Self::from_axes(apply(self.axis_x), apply(self.axis_y))
    }

    /// Samples of neighbour grid `grid` along `side` of our frame.
    pub fn read_side(&self, grid: &ColorGrid, side: Side) -> Vec<Rgba> {
        let n = grid.size();
        (0..n)
            .map(|k| {
                let (x, y) = side.coords(n, k);
                let (nx, ny) = self.map_point(x, y, n);
                grid.get(nx, ny)
            })
            .collect()
    }

    /// The whole neighbour grid resampled into our frame.
    pub fn orient_grid(&self, grid: &ColorGrid) -> ColorGrid {
        let n = grid.size();
        ColorGrid::from_fn(n, |x, y| {
            let (nx, ny) = self.map_point(x, y, n);
            grid.get(nx, ny)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> ColorGrid {
        ColorGrid::from_fn(n, |x, y| [x as u8, y as u8, 0, 255])
    }

    #[test]
    fn test_all_elements_distinct() {
        let all = FrameAdapter::all();
        for i in 0..8 {
            for j in i + 1..8 {
                assert_ne!(all[i], all[j]);
            }
        }
        assert!(all[0].is_identity());
        assert_eq!(all.iter().filter(|a| a.is_mirrored()).count(), 4);
    }

    #[test]
    fn test_maps_stay_inside_grid() {
        for adapter in FrameAdapter::all() {
            let mut seen = vec![false; 16];
            for y in 0..4 {
                for x in 0..4 {
                    let (nx, ny) = adapter.map_point(x, y, 4);
                    assert!(nx < 4 && ny < 4);
                    seen[nx + ny * 4] = true;
                }
            }
            assert!(seen.iter().all(|s| *s), "{:?} is not a bijection", adapter);
        }
    }

    #[test]
    fn test_inverse_and_compose() {
        for a in FrameAdapter::all() {
            assert!(a.then(&a.inverse()).is_identity());
            assert!(a.inverse().then(&a).is_identity());
            for b in FrameAdapter::all() {
                let ab = a.then(&b);
                for (x, y) in [(0, 0), (2, 1), (1, 3)] {
                    let (ax, ay) = a.map_point(x, y, 4);
                    assert_eq!(ab.map_point(x, y, 4), b.map_point(ax, ay, 4));
                }
            }
        }
    }

    #[test]
    fn test_aligned_neighbours_use_identity() {
        assert!(FrameAdapter::from_sides(Side::Right, Side::Left, false).is_identity());
        assert!(FrameAdapter::from_sides(Side::Top, Side::Bottom, false).is_identity());
    }

    #[test]
    fn test_from_sides_hits_requested_side() {
        for my in Side::ALL {
            for theirs in Side::ALL {
                for reversed in [false, true] {
                    let adapter = FrameAdapter::from_sides(my, theirs, reversed);
                    assert_eq!(adapter.map_side(my.opposite()), (theirs, reversed));
                }
            }
        }
    }

    #[test]
    fn test_inverse_is_neighbours_view() {
        for my in Side::ALL {
            for theirs in Side::ALL {
                for reversed in [false, true] {
                    let ours = FrameAdapter::from_sides(my, theirs, reversed);
                    let back = FrameAdapter::from_sides(theirs, my, reversed);
                    assert_eq!(ours.inverse(), back);
                }
            }
        }
    }

    #[test]
    fn test_read_side_through_rotation() {
        // Neighbour touches our right side with its bottom side, running the same way
        let adapter = FrameAdapter::from_sides(Side::Right, Side::Bottom, false);
        let grid = numbered(3);
        assert_eq!(adapter.read_side(&grid, Side::Left), grid.side(Side::Bottom));

        // Same contact, opposite direction
        let adapter = FrameAdapter::from_sides(Side::Right, Side::Bottom, true);
        let mut expected = grid.side(Side::Bottom);
        expected.reverse();
        assert_eq!(adapter.read_side(&grid, Side::Left), expected);
    }

    #[test]
    fn test_orient_grid_matches_read_side() {
        let grid = numbered(4);
        for adapter in FrameAdapter::all() {
            let oriented = adapter.orient_grid(&grid);
            for side in Side::ALL {
                assert_eq!(oriented.side(side), adapter.read_side(&grid, side));
            }
        }
    }
}
