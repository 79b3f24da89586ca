//! Sampling primitives.

use huum_core::{HuError, HuResult, NodeId, SimRng, SimTime};
use huum_tree::Target;

// ── ValueSource ───────────────────────────────────────────────────────────────

/// Read access to the functions a path can name.
///
/// The two `call_*` methods are the two call signatures a function target
/// can be used with; which one applies is fixed by the payload variant that
/// holds the function, never by the call site.
pub trait ValueSource {
    /// Resolve `path` from `origin` to exactly one function target.
    fn resolve_function(&self, origin: NodeId, path: &str) -> HuResult<Target>;

    /// `(tick) -> value`: distributions, activation offsets.
    fn call_at(&self, target: Target, now: SimTime) -> HuResult<f64>;

    /// `(status guard) -> value`: usage-habit payloads.
    fn call_for_status(&self, target: Target, guard: &str) -> HuResult<f64>;
}

// ── FunctionSlot ──────────────────────────────────────────────────────────────

/// An indirect function reference: a path plus the node it is resolved from,
/// memoized on first resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSlot {
    pub origin: NodeId,
    pub path:   String,
    target:     Option<Target>,
}

impl FunctionSlot {
    pub fn new(origin: NodeId, path: impl Into<String>) -> Self {
        Self { origin, path: path.into(), target: None }
    }

    /// Resolve (once) and return the target.
    pub fn bind(&mut self, src: &dyn ValueSource) -> HuResult<Target> {
        match self.target {
            Some(t) => Ok(t),
            None => {
                let t = src.resolve_function(self.origin, &self.path)?;
                self.target = Some(t);
                Ok(t)
            }
        }
    }

    /// The memoized target; fails if [`bind`](Self::bind) never ran.
    pub fn target(&self) -> HuResult<Target> {
        self.target.ok_or_else(|| {
            HuError::InvariantViolation(format!("function `{}` used before it was bound", self.path))
        })
    }

    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }
}

// ── Distribution ──────────────────────────────────────────────────────────────

/// A value or time-of-day offset drawn per use.
#[derive(Clone, Debug, PartialEq)]
pub enum Distribution {
    Constant(f64),
    Uniform { from: f64, to: f64 },
    Gaussian { mu: f64, sigma: f64 },
    /// Indirect function called with the current time.
    Function(FunctionSlot),
}

impl Distribution {
    /// Reject parameters that can never be sampled.
    pub fn validate(&self) -> HuResult<()> {
        match *self {
            Distribution::Uniform { from, to } if from > to => Err(HuError::defect(format!(
                "uniform distribution with from {from} > to {to}"
            ))),
            Distribution::Gaussian { sigma, .. } if !(sigma >= 0.0 && sigma.is_finite()) => {
                Err(HuError::defect(format!("gaussian distribution with sigma {sigma}")))
            }
            _ => Ok(()),
        }
    }

    /// Draw a bare value.
    pub fn sample(&mut self, rng: &mut SimRng, src: &dyn ValueSource, now: SimTime) -> HuResult<f64> {
        match self {
            Distribution::Constant(v) => Ok(*v),
            Distribution::Uniform { from, to } => Ok(rng.uniform(*from, *to)),
            Distribution::Gaussian { mu, sigma } => rng.gaussian(*mu, *sigma),
            Distribution::Function(slot) => {
                let target = slot.bind(src)?;
                src.call_at(target, now)
            }
        }
    }

    /// Draw an offset from local midnight, in whole seconds.
    pub fn sample_offset(
        &mut self,
        rng: &mut SimRng,
        src: &dyn ValueSource,
        now: SimTime,
    ) -> HuResult<i64> {
        let secs = self.sample(rng, src, now)?;
        if !secs.is_finite() {
            return Err(HuError::InvariantViolation(format!("activation offset {secs} is not finite")));
        }
        Ok(secs.round() as i64)
    }

    /// Resolve an indirect function now instead of on first use.
    pub fn bind(&mut self, src: &dyn ValueSource) -> HuResult<()> {
        if let Distribution::Function(slot) = self {
            slot.bind(src)?;
        }
        Ok(())
    }
}
