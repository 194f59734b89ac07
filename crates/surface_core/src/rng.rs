//! Random source abstraction for the solver.
//!
//! The solver draws two kinds of values: a cell index when seeding and a
//! rule index when collapsing. Both go through [`TileRng`], so callers can
//! plug in any generator. A fixed seed with a fixed graph and catalog gives
//! a fixed assignment.
//!
//! # Example
//!
//! ```ignore
//! use surface_core::rng::{StdRandom, TileRng};
//!
//! let mut rng = StdRandom::from_u64_seed(42);
//! let pick = rng.next_usize_max(10); // 0..10
//! let unit = rng.next_double(); // 0.0..1.0
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random number source used by the solver.
pub trait TileRng {
    /// Returns a random double in [0.0, 1.0).
    fn next_double(&mut self) -> f64;

    /// Returns a random u64.
    fn next_u64(&mut self) -> u64;

    /// Returns a random usize in [0, max). Returns 0 when `max` is 0.
    fn next_usize_max(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        ((self.next_double() * max as f64) as usize).min(max - 1)
    }
}

/// `rand::rngs::StdRng` wrapper.
#[derive(Clone, Debug)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_u64_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from OS entropy. Runs are not reproducible.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl TileRng for StdRandom {
    fn next_double(&mut self) -> f64 {
        self.rng.gen()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }

    fn next_usize_max(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        self.rng.gen_range(0..max)
    }
}

impl<R: TileRng + ?Sized> TileRng for &mut R {
    fn next_double(&mut self) -> f64 {
        (**self).next_double()
    }

    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }

    fn next_usize_max(&mut self, max: usize) -> usize {
        (**self).next_usize_max(max)
    }
}
