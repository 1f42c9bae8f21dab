//! Seeded randomness for the simulation.
//!
//! Every draw goes through these helpers so that degenerate ranges (lo == hi,
//! or inverted after a resize) never panic the way `gen_range` would.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub struct SimRng {
    inner: SmallRng,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self { inner: SmallRng::seed_from_u64(seed) }
    }

    /// Uniform in [0, 1)
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform in [-0.5, 0.5)
    #[inline]
    pub fn centered(&mut self) -> f32 {
        self.unit() - 0.5
    }

    /// Uniform between `lo` and `hi` (either order)
    #[inline]
    pub fn between(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.unit() * (hi - lo)
    }

    /// Uniform in [-span/2, span/2)
    #[inline]
    pub fn spread(&mut self, span: f32) -> f32 {
        self.centered() * span
    }
}
