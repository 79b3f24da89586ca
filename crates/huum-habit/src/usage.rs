//! A single usage habit.

use huum_core::{HuError, HuResult, SimTime};

use crate::{FunctionSlot, ValueSource};

/// How a habit combines with the others for the same appliance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HabitKind {
    Additive,
    Multiplicative,
}

impl HabitKind {
    /// 0 for additive, 1 for multiplicative.
    pub fn neutral(self) -> f64 {
        match self {
            HabitKind::Additive => 0.0,
            HabitKind::Multiplicative => 1.0,
        }
    }

    pub fn parse(s: &str) -> HuResult<HabitKind> {
        match s.to_ascii_lowercase().as_str() {
            "add" | "additive" => Ok(HabitKind::Additive),
            "mult" | "multiplicative" => Ok(HabitKind::Multiplicative),
            other => Err(HuError::defect(format!("unsupported habit kind `{other}`"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HabitPayload {
    Constant(f64),
    /// One value per tick from the habit's start.
    Table(Vec<f64>),
    /// Called with the habit's status guard (`"default"` when unguarded).
    Function(FunctionSlot),
}

/// A time-windowed contribution to one appliance's want-probability.
///
/// The window is half-open: active for `start <= now < end`.
#[derive(Clone, Debug, PartialEq)]
pub struct UsageHabit {
    pub name:      String,
    /// Appliance class this habit targets.
    pub appliance: String,
    pub start:     SimTime,
    pub end:       SimTime,
    kind:          HabitKind,
    /// Status prefix this habit is restricted to.
    pub guard:     Option<String>,
    pub payload:   HabitPayload,
}

impl UsageHabit {
    pub fn new(
        name: impl Into<String>,
        appliance: impl Into<String>,
        start: SimTime,
        end: SimTime,
        kind: HabitKind,
        guard: Option<String>,
        payload: HabitPayload,
    ) -> Self {
        Self {
            name: name.into().to_lowercase(),
            appliance: appliance.into().to_lowercase(),
            start,
            end,
            kind,
            guard: guard.map(|g| g.to_lowercase()),
            payload,
        }
    }

    pub fn kind(&self) -> HabitKind {
        self.kind
    }

    /// Targets `appliance` and the guard admits `status`.
    pub fn applies_to(&self, appliance: &str, status: &str) -> bool {
        self.appliance == appliance && self.guard.as_deref().is_none_or(|g| status.starts_with(g))
    }

    #[inline]
    pub fn is_expired(&self, now: SimTime) -> bool {
        self.end <= now
    }

    #[inline]
    pub fn has_started(&self, now: SimTime) -> bool {
        self.start <= now
    }

    /// The habit's value at `now`.
    ///
    /// Before `start` the neutral value is returned.  Asking an expired habit
    /// is an invariant violation: expired habits must have been pruned.
    pub fn value(&self, now: SimTime, tick_len: i64, src: &dyn ValueSource) -> HuResult<f64> {
        if self.is_expired(now) {
            return Err(HuError::InvariantViolation(format!(
                "habit `{}` queried at {now} after its end {}",
                self.name, self.end
            )));
        }
        if !self.has_started(now) {
            return Ok(self.kind.neutral());
        }
        match &self.payload {
            HabitPayload::Constant(v) => Ok(*v),
            HabitPayload::Table(values) => {
                let idx = ((now - self.start) / tick_len.max(1)) as usize;
                Ok(values.get(idx).copied().unwrap_or(self.kind.neutral()))
            }
            HabitPayload::Function(slot) => {
                let guard = self.guard.as_deref().unwrap_or("default");
                src.call_for_status(slot.target()?, guard)
            }
        }
    }

    /// Resolve a function payload.  No-op for the other payloads.
    pub fn bind(&mut self, src: &dyn ValueSource) -> HuResult<()> {
        if let HabitPayload::Function(slot) = &mut self.payload {
            slot.bind(src)?;
        }
        Ok(())
    }
}
