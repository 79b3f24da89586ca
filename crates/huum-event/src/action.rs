//! The action vocabulary.

use std::fmt;

use huum_core::{HuError, HuResult};

/// Everything an effect can ask a target to do.
///
/// Parsed once at load time from a lowercase dotted string.  Strings that do
/// not parse are rejected there; whether a target implements an action is
/// checked when the action reaches it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// `event.activate`: on an event.
    EventActivate,
    /// `event.deactivate`: on an event.
    EventDeactivate,
    /// `event.activate.<name>`: on the owner of an event called `<name>`.
    ActivateEvent(String),
    /// `event.deactivate.<name>`
    DeactivateEvent(String),
    /// `probability.add`: instantiate a template on an agent.
    HabitAdd,
    /// `probability.del`: delete habits by name or `prefix_`.
    HabitDelete,
    /// `usage_pattern.add`
    PatternAdd,
    /// `usage_pattern.del`
    PatternDelete,
    /// `storage.empty`
    StorageEmpty,
    /// `storage.add_volume`
    StorageAddVolume,
    /// `storage.set_random`
    StorageSetRandom,
    /// `passed_time.empty`
    ElapsedReset,
    /// `<$child_local_id>.<action>`: forward to a direct child.
    Child { child: String, action: Box<Action> },
}

impl Action {
    pub fn parse(raw: &str) -> HuResult<Action> {
        let lowered = raw.trim().to_lowercase();
        let parts: Vec<&str> = lowered.split('.').collect();
        Self::from_parts(&parts).ok_or_else(|| HuError::unsupported(raw.trim(), "any target"))
    }

    fn from_parts(parts: &[&str]) -> Option<Action> {
        let action = match parts {
            [child, rest @ ..] if child.starts_with('$') && !rest.is_empty() => Action::Child {
                child:  (*child).to_string(),
                action: Box::new(Self::from_parts(rest)?),
            },
            ["event", "activate"] => Action::EventActivate,
            ["event", "deactivate"] => Action::EventDeactivate,
            ["event", "activate", name] => Action::ActivateEvent((*name).to_string()),
            ["event", "deactivate", name] => Action::DeactivateEvent((*name).to_string()),
            ["probability", "add"] => Action::HabitAdd,
            ["probability", "del"] => Action::HabitDelete,
            ["usage_pattern", "add"] => Action::PatternAdd,
            ["usage_pattern", "del"] => Action::PatternDelete,
            ["storage", "empty"] => Action::StorageEmpty,
            ["storage", "add_volume"] => Action::StorageAddVolume,
            ["storage", "set_random"] => Action::StorageSetRandom,
            ["passed_time", "empty"] => Action::ElapsedReset,
            _ => return None,
        };
        Some(action)
    }

    /// The action a child forward finally lands on.
    pub fn leaf(&self) -> &Action {
        match self {
            Action::Child { action, .. } => action.leaf(),
            other => other,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::EventActivate => f.write_str("event.activate"),
            Action::EventDeactivate => f.write_str("event.deactivate"),
            Action::ActivateEvent(name) => write!(f, "event.activate.{name}"),
            Action::DeactivateEvent(name) => write!(f, "event.deactivate.{name}"),
            Action::HabitAdd => f.write_str("probability.add"),
            Action::HabitDelete => f.write_str("probability.del"),
            Action::PatternAdd => f.write_str("usage_pattern.add"),
            Action::PatternDelete => f.write_str("usage_pattern.del"),
            Action::StorageEmpty => f.write_str("storage.empty"),
            Action::StorageAddVolume => f.write_str("storage.add_volume"),
            Action::StorageSetRandom => f.write_str("storage.set_random"),
            Action::ElapsedReset => f.write_str("passed_time.empty"),
            Action::Child { child, action } => write!(f, "{child}.{action}"),
        }
    }
}
