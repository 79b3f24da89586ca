//! The simulation's random stream.
//!
//! A run draws every random number from one `SimRng`, in a fixed order
//! dictated by the scheduler.  Replaying a run with the same scenario, seed
//! and tick count reproduces every draw.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::{HuError, HuResult};

/// Simulation-level RNG.
///
/// Not `Sync`: the scheduler is single threaded and owns the only instance.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// A draw from `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// A draw from `[from, to)`; degenerate ranges return `from`.
    pub fn uniform(&mut self, from: f64, to: f64) -> f64 {
        if to > from { self.0.gen_range(from..to) } else { from }
    }

    /// A draw from the normal distribution `N(mu, sigma²)`.
    ///
    /// `sigma` must be finite and non-negative.
    pub fn gaussian(&mut self, mu: f64, sigma: f64) -> HuResult<f64> {
        if !(sigma >= 0.0 && sigma.is_finite()) {
            return Err(HuError::defect(format!("gaussian({mu}, {sigma}): sigma must be finite and non-negative")));
        }
        let normal = Normal::new(mu, sigma)
            .map_err(|e| HuError::defect(format!("gaussian({mu}, {sigma}): {e}")))?;
        Ok(normal.sample(&mut self.0))
    }
}
