//! Events.

use tracing::debug;

use huum_core::{EventId, HuError, HuResult, NodeId, SimRng, SimTime};
use huum_habit::{Distribution, ValueSource};

use crate::{EventEffect, EventQueue, QueueItem};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Fires when a uniform draw falls at or below a sampled probability.
    Probability,
    /// Fires every scan while the switch is set.
    Switch,
    /// Fires only when invoked directly (lifecycle exit, appliance grant).
    Activate,
}

impl EventKind {
    pub fn parse(s: &str) -> HuResult<EventKind> {
        match s.to_ascii_lowercase().as_str() {
            "probability" => Ok(EventKind::Probability),
            "switch" => Ok(EventKind::Switch),
            "activate" => Ok(EventKind::Activate),
            other => Err(HuError::defect(format!("unsupported event kind `{other}`"))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Event {
    pub node:        NodeId,
    pub name:        String,
    pub kind:        EventKind,
    /// Required for `Probability` events.
    pub probability: Option<Distribution>,
    pub switch:      bool,
    pub active:      bool,
    pub effects:     Vec<EventEffect>,
}

impl Event {
    pub fn new(node: NodeId, name: impl Into<String>, kind: EventKind) -> Self {
        Self {
            node,
            name: name.into().to_lowercase(),
            kind,
            probability: None,
            switch: false,
            active: true,
            effects: Vec::new(),
        }
    }

    /// Per-tick scan decision for `Probability` and `Switch` events.
    ///
    /// Inactive and `Activate` events never fire here.  Only `Probability`
    /// events consume random numbers.
    pub fn check(&mut self, rng: &mut SimRng, src: &dyn ValueSource, now: SimTime) -> HuResult<bool> {
        if !self.active {
            return Ok(false);
        }
        match self.kind {
            EventKind::Activate => Ok(false),
            EventKind::Switch => Ok(self.switch),
            EventKind::Probability => {
                let dist = self.probability.as_mut().ok_or_else(|| {
                    HuError::defect(format!("probability event `{}` has no distribution", self.name))
                })?;
                let p = dist.sample(rng, src, now)?;
                Ok(p >= rng.unit())
            }
        }
    }

    /// Queue one item per effect.  Returns how many were queued.
    pub fn fire(&self, id: EventId, queue: &mut EventQueue, time_start: Option<SimTime>) -> usize {
        if !self.active {
            return 0;
        }
        debug!(target: "huum::events", event = %self.name, effects = self.effects.len(), "fired");
        for effect in 0..self.effects.len() {
            queue.push(QueueItem { event: id, effect, time_start });
        }
        self.effects.len()
    }
}
