//! Piecewise-linear lookup tables.
//!
//! `Table1d` backs every "x/y curve" in a scenario: storage and elapsed-time
//! translators, usage-habit templates and appliance usage patterns.  The
//! latter two are resampled once at tick resolution with [`Table1d::resample`]
//! so the per-tick lookup is a plain index.

use crate::{HuError, HuResult};

/// What to return for an `x` outside the table's range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Bound {
    /// The first `y` value.
    First,
    /// The last `y` value.
    #[default]
    Last,
    /// Zero.
    Zero,
}

impl Bound {
    /// Parse `"first"`, `"last"` or `"none"` (case-insensitive).
    pub fn parse(s: &str) -> HuResult<Bound> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(Bound::First),
            "last" => Ok(Bound::Last),
            "none" | "zero" => Ok(Bound::Zero),
            other => Err(HuError::defect(format!("unsupported table bound `{other}`"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table1d {
    xs:    Vec<f64>,
    ys:    Vec<f64>,
    above: Bound,
    below: Bound,
}

impl Table1d {
    /// Build a table.  `xs` must be non-empty, ascending and as long as `ys`.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, above: Bound, below: Bound) -> HuResult<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return Err(HuError::defect(format!(
                "table needs matching non-empty x/y arrays (got {} and {})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.windows(2).any(|w| w[1] < w[0]) {
            return Err(HuError::defect("table x values must be ascending"));
        }
        Ok(Self { xs, ys, above, below })
    }

    /// A table that clamps to its end values on both sides.
    pub fn clamped(xs: Vec<f64>, ys: Vec<f64>) -> HuResult<Self> {
        Self::new(xs, ys, Bound::Last, Bound::First)
    }

    /// Largest `x` in the table.
    pub fn x_max(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }

    fn bound(&self, b: Bound) -> f64 {
        match b {
            Bound::First => self.ys[0],
            Bound::Last => self.ys[self.ys.len() - 1],
            Bound::Zero => 0.0,
        }
    }

    /// Interpolated value at `x`.
    pub fn value(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x < self.xs[0] {
            return self.bound(self.below);
        }
        if x > self.xs[n - 1] {
            return self.bound(self.above);
        }
        if x == self.xs[n - 1] {
            return self.ys[n - 1];
        }
        // first index with xs[i] > x; guaranteed in 1..n here
        let hi = self.xs.partition_point(|&v| v <= x);
        let lo = hi - 1;
        let span = self.xs[hi] - self.xs[lo];
        if span == 0.0 {
            return self.ys[hi];
        }
        let rat = (x - self.xs[lo]) / span;
        self.ys[lo] + rat * (self.ys[hi] - self.ys[lo])
    }

    /// Sample `count` values at `x = 0, step, 2·step, …`.
    pub fn resample(&self, step: f64, count: usize) -> Vec<f64> {
        (0..count).map(|i| self.value(i as f64 * step)).collect()
    }
}
