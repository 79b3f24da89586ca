//! Node type tags and the per-type addressing tables.

use std::fmt;

/// Fixed set of node types.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum NodeKind {
    Model,
    Holding,
    ConsumerUnit,
    Room,
    Appliance,
    Agent,
    Event,
    Storage,
    ElapsedTime,
    LifecycleHabit,
    UsageHabit,
}

const LEDGERS: [NodeKind; 3] = [NodeKind::Event, NodeKind::Storage, NodeKind::ElapsedTime];

impl NodeKind {
    pub const ALL: [NodeKind; 11] = [
        NodeKind::Model,
        NodeKind::Holding,
        NodeKind::ConsumerUnit,
        NodeKind::Room,
        NodeKind::Appliance,
        NodeKind::Agent,
        NodeKind::Event,
        NodeKind::Storage,
        NodeKind::ElapsedTime,
        NodeKind::LifecycleHabit,
        NodeKind::UsageHabit,
    ];

    /// Path keyword, also the prefix of every local id of this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            NodeKind::Model => "$model",
            NodeKind::Holding => "$holding",
            NodeKind::ConsumerUnit => "$cu",
            NodeKind::Room => "$room",
            NodeKind::Appliance => "$appliance",
            NodeKind::Agent => "$agent",
            NodeKind::Event => "$event",
            NodeKind::Storage => "$storage",
            NodeKind::ElapsedTime => "$passedtime",
            NodeKind::LifecycleHabit => "$lifestylehabit",
            NodeKind::UsageHabit => "$usagehabit",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<NodeKind> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    /// Child kinds a path may descend into from a node of this kind.
    pub fn targetable_children(self) -> &'static [NodeKind] {
        use NodeKind::*;
        match self {
            Model => &[Holding, Event, Storage, ElapsedTime],
            Holding => &[ConsumerUnit, Event, Storage, ElapsedTime],
            ConsumerUnit => &[Room, Agent, Event, Storage, ElapsedTime],
            Room => &[Appliance, Event, Storage, ElapsedTime],
            Appliance => &LEDGERS,
            Agent => &[Event, Storage, ElapsedTime, LifecycleHabit, UsageHabit],
            LifecycleHabit | UsageHabit => &[Event],
            Event | Storage | ElapsedTime => &[],
        }
    }

    pub fn can_contain(self, child: NodeKind) -> bool {
        self.targetable_children().contains(&child)
    }

    /// Function keywords a node of this kind exposes.
    pub fn functions(self) -> &'static [FunctionKind] {
        match self {
            NodeKind::Storage | NodeKind::ElapsedTime => &[FunctionKind::ValueFunction],
            NodeKind::Appliance => &[FunctionKind::Occupant],
            NodeKind::ConsumerUnit => &[FunctionKind::AllAgents],
            _ => &[],
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keyword()[1..])
    }
}

/// Callables a path can name that are not nodes themselves.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FunctionKind {
    /// `$get_value_function`: a ledger's translated value.
    ValueFunction,
    /// `$replace_user`: an appliance's current occupant, if any.
    Occupant,
    /// `$replace_all_agents`: every agent of a consumer unit.
    AllAgents,
}

impl FunctionKind {
    pub fn keyword(self) -> &'static str {
        match self {
            FunctionKind::ValueFunction => "$get_value_function",
            FunctionKind::Occupant => "$replace_user",
            FunctionKind::AllAgents => "$replace_all_agents",
        }
    }
}
