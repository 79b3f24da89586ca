//! Event effects.

use huum_appliance::UsagePattern;
use huum_core::{HuError, HuResult, NodeId, SimTime};
use huum_habit::{Distribution, UsageHabitTemplate};
use huum_tree::{Target, Tree};

use crate::Action;

/// The payload an effect hands to its target along with the action.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectPayload {
    None,
    /// A name: habit id (or `prefix_`) or pattern name.
    Name(String),
    Template(UsageHabitTemplate),
    Pattern(UsagePattern),
    Distribution(Distribution),
    Number(f64),
    Time(SimTime),
}

impl EffectPayload {
    fn describe(&self) -> &'static str {
        match self {
            EffectPayload::None => "no payload",
            EffectPayload::Name(_) => "a name",
            EffectPayload::Template(_) => "a usage-habit template",
            EffectPayload::Pattern(_) => "a usage pattern",
            EffectPayload::Distribution(_) => "a distribution",
            EffectPayload::Number(_) => "a number",
            EffectPayload::Time(_) => "a timestamp",
        }
    }

    fn fits(&self, action: &Action) -> bool {
        use EffectPayload as P;
        match action.leaf() {
            Action::HabitAdd => matches!(self, P::Template(_)),
            Action::HabitDelete | Action::PatternDelete => matches!(self, P::Name(_)),
            Action::PatternAdd => matches!(self, P::Pattern(_)),
            Action::StorageAddVolume => matches!(self, P::Distribution(_) | P::Number(_)),
            Action::StorageSetRandom => matches!(self, P::Distribution(_)),
            Action::ElapsedReset => matches!(self, P::None | P::Time(_)),
            _ => true,
        }
    }
}

/// One thing an event does when it fires.
#[derive(Clone, Debug)]
pub struct EventEffect {
    /// Node the target path is resolved from (the owning event).
    pub origin:  NodeId,
    pub path:    String,
    pub action:  Action,
    pub payload: EffectPayload,
    target:      Option<Target>,
}

impl EventEffect {
    /// Build an effect, rejecting payloads the action cannot use.
    pub fn new(origin: NodeId, path: impl Into<String>, action: Action, payload: EffectPayload) -> HuResult<Self> {
        if !payload.fits(&action) {
            return Err(HuError::defect(format!(
                "action `{action}` cannot take {}",
                payload.describe()
            )));
        }
        Ok(Self { origin, path: path.into(), action, payload, target: None })
    }

    /// Resolve the target path once; later calls return the cached target.
    pub fn connect<P>(&mut self, tree: &Tree<P>) -> HuResult<Target> {
        if let Some(t) = self.target {
            return Ok(t);
        }
        let t = tree.resolve_one(self.origin, &self.path)?;
        self.target = Some(t);
        Ok(t)
    }

    /// The cached target; fails if the effect was never connected.
    pub fn target(&self) -> HuResult<Target> {
        self.target.ok_or_else(|| {
            HuError::InvariantViolation(format!("effect `{}` on `{}` executed before connect", self.action, self.path))
        })
    }
}
