//! Per-agent lifecycle status machine.
//!
//! # Transition timing
//!
//! When a state is entered at `now`, the time of the next change is
//!
//! ```text
//! offset = activation offset of the *next* state (seconds from midnight)
//! floor  = now + min_duration of the *current* state   (only if > 0)
//! t      = midnight(now) + max(floor - midnight(now), offset)
//! t     += 1 day   if t < now
//! ```
//!
//! The machine is polled once per tick; a due transition fires exactly once
//! even if several would have been due.

use std::str::FromStr;

use chrono::Weekday;
use tracing::debug;

use huum_core::{EventId, HuError, HuResult, NodeId, SECS_PER_DAY, SimRng, SimTime};

use crate::{Distribution, ValueSource};

pub const INITIAL_STATE: &str = "initial";

// ── Conditions ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// `$weekday == <day>` / `$weekday != <day>`.
    Weekday { day: Weekday, negate: bool },
}

impl Condition {
    /// Build from `(variable, operator, value)`.
    pub fn parse(variable: &str, operator: &str, value: &str) -> HuResult<Condition> {
        match variable.to_ascii_lowercase().as_str() {
            "$weekday" => {
                let day = Weekday::from_str(value.trim())
                    .map_err(|_| HuError::defect(format!("unknown weekday `{value}`")))?;
                let negate = match operator.trim() {
                    "==" => false,
                    "!=" => true,
                    other => return Err(HuError::defect(format!("unsupported operator `{other}`"))),
                };
                Ok(Condition::Weekday { day, negate })
            }
            other => Err(HuError::defect(format!("unsupported condition variable `{other}`"))),
        }
    }

    pub fn holds(&self, now: SimTime) -> bool {
        match *self {
            Condition::Weekday { day, negate } => (now.weekday() == day) != negate,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alternative {
    pub condition: Condition,
    /// Key of the state to enter.
    pub target:    String,
}

/// Ordered alternatives; the first holding condition wins.
#[derive(Clone, Debug, PartialEq)]
pub struct NextStatus {
    pub alternatives: Vec<Alternative>,
    pub default:      String,
}

impl NextStatus {
    pub fn choose(&self, now: SimTime) -> &str {
        self.alternatives
            .iter()
            .find(|a| a.condition.holds(now))
            .map_or(self.default.as_str(), |a| a.target.as_str())
    }

    fn targets(&self) -> impl Iterator<Item = &str> {
        self.alternatives.iter().map(|a| a.target.as_str()).chain(std::iter::once(self.default.as_str()))
    }
}

// ── LifecycleHabit ────────────────────────────────────────────────────────────

/// One state of the machine.
#[derive(Clone, Debug)]
pub struct LifecycleHabit {
    /// Unique per agent; `"initial"` is the entry state.
    pub key:          String,
    /// Status label usage habits are guarded against.
    pub status:       String,
    /// Seconds; non-positive means no floor.
    pub min_duration: i64,
    pub activation:   Distribution,
    pub next:         NextStatus,
    /// The habit's tree node.
    pub node:         NodeId,
    /// Events owned by this state; Activate-kind ones fire on exit.
    pub events:       Vec<EventId>,
}

impl LifecycleHabit {
    /// Time of the next change when this habit's activation offset decides
    /// it, with `min_duration` as a floor.
    pub fn activation_time(
        &mut self,
        min_duration: i64,
        now: SimTime,
        rng: &mut SimRng,
        src: &dyn ValueSource,
    ) -> HuResult<SimTime> {
        let day = now.day_start();
        let offset = self.activation.sample_offset(rng, src, now)?;
        let mut target = if min_duration > 0 {
            day + ((now - day) + min_duration).max(offset)
        } else {
            day + offset
        };
        if now > target {
            target = target + SECS_PER_DAY;
        }
        Ok(target)
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// Which states a transition moved between (indices into `habits()`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub left:    usize,
    pub entered: usize,
}

#[derive(Clone, Debug)]
pub struct Lifecycle {
    habits:      Vec<LifecycleHabit>,
    current:     usize,
    next:        usize,
    next_change: SimTime,
}

impl Lifecycle {
    /// Validate the state set: unique keys, an `initial` state, and every
    /// alternative naming an existing state.
    pub fn new(habits: Vec<LifecycleHabit>) -> HuResult<Self> {
        for (i, h) in habits.iter().enumerate() {
            if habits[..i].iter().any(|o| o.key == h.key) {
                return Err(HuError::defect(format!("duplicate lifecycle habit `{}`", h.key)));
            }
        }
        let current = habits
            .iter()
            .position(|h| h.key == INITIAL_STATE)
            .ok_or_else(|| HuError::defect("no `initial` lifecycle habit"))?;
        for h in &habits {
            if let Some(missing) = h.next.targets().find(|t| !habits.iter().any(|o| o.key == *t)) {
                return Err(HuError::defect(format!(
                    "lifecycle habit `{}` names unknown next state `{missing}`",
                    h.key
                )));
            }
        }
        Ok(Self { habits, current, next: current, next_change: SimTime::default() })
    }

    fn index_of(&self, key: &str) -> HuResult<usize> {
        self.habits
            .iter()
            .position(|h| h.key == key)
            .ok_or_else(|| HuError::InvariantViolation(format!("lifecycle state `{key}` vanished")))
    }

    /// Enter `initial` at `now`.
    pub fn start(&mut self, now: SimTime, rng: &mut SimRng, src: &dyn ValueSource) -> HuResult<()> {
        self.current = self.index_of(INITIAL_STATE)?;
        let next_key = self.habits[self.current].next.choose(now).to_string();
        self.next = self.index_of(&next_key)?;
        let min = self.habits[self.current].min_duration;
        self.next_change = self.habits[self.current].activation_time(min, now, rng, src)?;
        Ok(())
    }

    /// Move to the chosen next state if it is due.
    pub fn poll(
        &mut self,
        now: SimTime,
        rng: &mut SimRng,
        src: &dyn ValueSource,
    ) -> HuResult<Option<Transition>> {
        if self.next_change > now {
            return Ok(None);
        }
        let left = self.current;
        self.current = self.next;
        let next_key = self.habits[self.current].next.choose(now).to_string();
        self.next = self.index_of(&next_key)?;
        let min = self.habits[self.current].min_duration;
        self.next_change = self.habits[self.next].activation_time(min, now, rng, src)?;
        debug!(
            target: "huum::lifecycle",
            from = %self.habits[left].key,
            to = %self.habits[self.current].key,
            next_change = %self.next_change,
            "status change"
        );
        Ok(Some(Transition { left, entered: self.current }))
    }

    pub fn status(&self) -> &str {
        &self.habits[self.current].status
    }

    pub fn current(&self) -> &LifecycleHabit {
        &self.habits[self.current]
    }

    pub fn next_change(&self) -> SimTime {
        self.next_change
    }

    pub fn habits(&self) -> &[LifecycleHabit] {
        &self.habits
    }

    pub fn habits_mut(&mut self) -> &mut [LifecycleHabit] {
        &mut self.habits
    }

    pub fn habit(&self, idx: usize) -> Option<&LifecycleHabit> {
        self.habits.get(idx)
    }
}
