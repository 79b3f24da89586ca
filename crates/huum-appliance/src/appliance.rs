//! A single appliance.

use huum_core::{AgentId, EventId, NodeId, SimTime};

use crate::UsagePattern;

#[derive(Clone, Debug)]
pub struct Appliance {
    pub node:           NodeId,
    pub name:           String,
    /// Class agents want (`"kettle"`); several appliances may share one.
    pub class:          String,
    /// Seconds a grant keeps the user busy.
    pub external_block: i64,
    /// `false` leaves the user free right after a grant.
    pub blocks_user:    bool,
    pub events:         Vec<EventId>,
    patterns:           Vec<UsagePattern>,
    pattern_block:      i64,
    /// Demand columns, fixed once the scenario is built.
    demand_types:       Vec<String>,
    occupant:           Option<AgentId>,
    blocked_until:      Option<SimTime>,
    activated:          bool,
}

impl Appliance {
    pub fn new(
        node: NodeId,
        name: impl Into<String>,
        class: impl Into<String>,
        external_block: i64,
        blocks_user: bool,
    ) -> Self {
        Self {
            node,
            name: name.into().to_lowercase(),
            class: class.into().to_lowercase(),
            external_block: external_block.max(0),
            blocks_user,
            events: Vec::new(),
            patterns: Vec::new(),
            pattern_block: 0,
            demand_types: Vec::new(),
            occupant: None,
            blocked_until: None,
            activated: false,
        }
    }

    // ── Patterns ──────────────────────────────────────────────────────────

    pub fn add_pattern(&mut self, pattern: UsagePattern) {
        if !self.demand_types.contains(&pattern.demand_type) {
            self.demand_types.push(pattern.demand_type.clone());
        }
        self.patterns.push(pattern);
        self.refresh_pattern_block();
    }

    /// Remove every pattern called `name`.  Returns how many went.
    pub fn remove_pattern(&mut self, name: &str) -> usize {
        let name = name.to_lowercase();
        let before = self.patterns.len();
        self.patterns.retain(|p| p.name != name);
        self.refresh_pattern_block();
        before - self.patterns.len()
    }

    fn refresh_pattern_block(&mut self) {
        self.pattern_block = self.patterns.iter().map(UsagePattern::length_secs).max().unwrap_or(0);
    }

    pub fn patterns(&self) -> &[UsagePattern] {
        &self.patterns
    }

    /// Longest pattern, in seconds.
    pub fn pattern_block(&self) -> i64 {
        self.pattern_block
    }

    /// Advance every pattern one tick.
    pub fn update(&mut self, now: SimTime) {
        for p in &mut self.patterns {
            p.update(now);
        }
    }

    pub fn demand_types(&self) -> &[String] {
        &self.demand_types
    }

    /// Current demand per demand type, in `demand_types()` order.
    pub fn demand(&self) -> Vec<f64> {
        self.demand_types
            .iter()
            .map(|t| self.patterns.iter().filter(|p| &p.demand_type == t).map(UsagePattern::value).sum())
            .collect()
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    /// Free once `now` reaches `blocked_until`; clears the occupant then.
    pub fn is_free(&mut self, now: SimTime) -> bool {
        if self.blocked_until.is_some_and(|until| until <= now) {
            self.blocked_until = None;
            self.occupant = None;
        }
        self.blocked_until.is_none()
    }

    pub fn occupant(&self) -> Option<AgentId> {
        self.occupant
    }

    pub fn blocked_until(&self) -> Option<SimTime> {
        self.blocked_until
    }

    /// Occupy the appliance.  Returns `(blocked_until, user busy_until)`.
    ///
    /// Callers must have checked [`is_free`](Self::is_free).
    pub fn occupy(&mut self, agent: AgentId, now: SimTime) -> (SimTime, Option<SimTime>) {
        let until = now + self.pattern_block.max(self.external_block);
        self.blocked_until = Some(until);
        self.occupant = Some(agent);
        for p in &mut self.patterns {
            p.activate(now);
        }
        self.activated = true;
        let busy = self.blocks_user.then(|| now + self.external_block);
        (until, busy)
    }

    /// Whether a grant happened since the last call; resets the flag.
    pub fn take_activation(&mut self) -> bool {
        std::mem::take(&mut self.activated)
    }
}
