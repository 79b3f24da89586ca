//! The world: node tree, typed arenas and everything that mutates them.
//!
//! Tree nodes carry a [`Slot`] naming the arena entry they stand for.
//! Effects and function payloads resolve against the tree once; at run time
//! everything is reached through arena indices.
//!
//! Function payloads read ledgers through a [`Scope`], a read-only view over
//! the tree and the ledgers.  It borrows disjoint fields, so agents, events
//! and the RNG stay mutably borrowable while a scope is alive.

use tracing::debug;

use huum_appliance::{Appliance, AppliancePool, grant_next};
use huum_core::{
    AgentId, ApplianceId, CuId, ElapsedId, EventId, HuError, HuResult, NodeId, RoomId, SimRng, SimTime,
    StorageId,
};
use huum_event::{Action, EffectPayload, Event, EventKind, EventQueue, QueueItem};
use huum_habit::{Distribution, ValueSource};
use huum_tree::{FunctionKind, Target, Tree};

use crate::observer::{Series, SeriesSource};
use crate::{Agent, ElapsedTime, Storage};

// ── Slots and containers ──────────────────────────────────────────────────────

/// What a tree node stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Model,
    Holding,
    Unit(CuId),
    Room(RoomId),
    Appliance(ApplianceId),
    Agent(AgentId),
    Event(EventId),
    Storage(StorageId),
    Elapsed(ElapsedId),
    /// State `index` of an agent's lifecycle.
    Lifecycle { agent: AgentId, index: usize },
    /// A habit loaded from the scenario.
    UsageHabit(AgentId),
}

/// A household: the unit the arbiter works within.
#[derive(Clone, Debug)]
pub struct ConsumerUnit {
    pub node:    NodeId,
    pub name:    String,
    pub rooms:   Vec<RoomId>,
    /// Update order.
    pub agents:  Vec<AgentId>,
    pub pool:    AppliancePool,
    /// Appliance classes in first-registration order.
    pub classes: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Room {
    pub node:       NodeId,
    pub name:       String,
    pub appliances: Vec<ApplianceId>,
}

/// Entry in the per-tick event scan.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Scan {
    Event(EventId),
    /// Events of whatever lifecycle state the agent is in.
    ActiveState(AgentId),
}

// ── Scope ─────────────────────────────────────────────────────────────────────

/// Read-only view answering function payloads.
pub struct Scope<'a> {
    tree:     &'a Tree<Slot>,
    storages: &'a [Storage],
    elapsed:  &'a [ElapsedTime],
    now:      SimTime,
}

impl<'a> Scope<'a> {
    pub fn new(tree: &'a Tree<Slot>, storages: &'a [Storage], elapsed: &'a [ElapsedTime], now: SimTime) -> Self {
        Self { tree, storages, elapsed, now }
    }

    fn value(&self, target: Target, now: SimTime, guard: &str) -> HuResult<f64> {
        let Target::Function { owner, function: FunctionKind::ValueFunction } = target else {
            return Err(HuError::InvariantViolation(format!("{target:?} is not a value function")));
        };
        match self.tree.node(owner)?.payload {
            Slot::Storage(s) => self.storages[s.index()].value(guard),
            Slot::Elapsed(e) => self.elapsed[e.index()].value(now, guard),
            other => Err(HuError::InvariantViolation(format!("{other:?} has no value function"))),
        }
    }
}

impl ValueSource for Scope<'_> {
    fn resolve_function(&self, origin: NodeId, path: &str) -> HuResult<Target> {
        let target = self.tree.resolve_function(origin, path)?;
        match target {
            Target::Function { function: FunctionKind::ValueFunction, .. } => Ok(target),
            _ => Err(HuError::Resolution {
                path:   path.to_string(),
                origin: self.tree.path_of(origin).to_string(),
                reason: "target is not a value function".into(),
            }),
        }
    }

    fn call_at(&self, target: Target, now: SimTime) -> HuResult<f64> {
        self.value(target, now, crate::ledger::DEFAULT_TRANSLATOR)
    }

    fn call_for_status(&self, target: Target, guard: &str) -> HuResult<f64> {
        self.value(target, self.now, guard)
    }
}

/// Queue every Activate-kind event among `ids`.
fn fire_activations(
    events: &[Event],
    ids: &[EventId],
    queue: &mut EventQueue,
    time_start: Option<SimTime>,
) -> usize {
    ids.iter()
        .filter(|id| events[id.index()].kind == EventKind::Activate)
        .map(|&id| events[id.index()].fire(id, queue, time_start))
        .sum()
}

// ── World ─────────────────────────────────────────────────────────────────────

pub struct World {
    pub tree:       Tree<Slot>,
    pub sim_start:  SimTime,
    pub tick_len:   i64,
    pub holdings:   Vec<NodeId>,
    pub units:      Vec<ConsumerUnit>,
    pub rooms:      Vec<Room>,
    pub appliances: Vec<Appliance>,
    pub agents:     Vec<Agent>,
    pub events:     Vec<Event>,
    pub storages:   Vec<Storage>,
    pub elapsed:    Vec<ElapsedTime>,
    pub queue:      EventQueue,
    pub(crate) rng:    SimRng,
    pub(crate) scan:   Vec<Scan>,
    pub(crate) series: Vec<Series>,
    executed:       u64,
}

impl World {
    pub fn new(sim_start: SimTime, tick_len: i64, seed: u64) -> Self {
        Self {
            tree: Tree::new(),
            sim_start,
            tick_len,
            holdings: Vec::new(),
            units: Vec::new(),
            rooms: Vec::new(),
            appliances: Vec::new(),
            agents: Vec::new(),
            events: Vec::new(),
            storages: Vec::new(),
            elapsed: Vec::new(),
            queue: EventQueue::new(),
            rng: SimRng::new(seed),
            scan: Vec::new(),
            series: Vec::new(),
            executed: 0,
        }
    }

    /// Effects executed since the run began.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn scope(&self, now: SimTime) -> Scope<'_> {
        Scope::new(&self.tree, &self.storages, &self.elapsed, now)
    }

    /// Look an agent up by name.
    pub fn agent(&self, name: &str) -> Option<&Agent> {
        let name = name.to_lowercase();
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn appliance(&self, name: &str) -> Option<&Appliance> {
        let name = name.to_lowercase();
        self.appliances.iter().find(|a| a.name == name)
    }

    pub fn storage(&self, name: &str) -> Option<&Storage> {
        let name = name.to_lowercase();
        self.storages.iter().find(|s| s.name == name)
    }

    // ── Start ─────────────────────────────────────────────────────────────

    /// Put every agent into its `initial` state.
    pub fn start(&mut self, now: SimTime) -> HuResult<()> {
        for agent in &mut self.agents {
            let src = Scope::new(&self.tree, &self.storages, &self.elapsed, now);
            agent.start(now, self.sim_start, self.tick_len, &mut self.rng, &src)?;
        }
        Ok(())
    }

    // ── Event queue ───────────────────────────────────────────────────────

    /// Swap the queue out and execute every item once.  Returns how many ran.
    pub fn drain_queue(&mut self, now: SimTime) -> HuResult<usize> {
        let items = self.queue.take();
        for &item in &items {
            self.execute(item, now)?;
        }
        Ok(items.len())
    }

    fn execute(&mut self, item: QueueItem, now: SimTime) -> HuResult<()> {
        let effect = self
            .events
            .get(item.event.index())
            .and_then(|e| e.effects.get(item.effect))
            .cloned()
            .ok_or_else(|| HuError::InvariantViolation(format!("queued effect {item:?} does not exist")))?;
        let target = effect.target()?;
        debug!(target: "huum::events", action = %effect.action, path = %effect.path, "executing effect");
        for node in self.expand(target, &effect.action)? {
            self.dispatch(node, &effect.action, &effect.payload, item.time_start, now)?;
        }
        self.executed += 1;
        Ok(())
    }

    /// The nodes a resolved target stands for right now.
    fn expand(&self, target: Target, action: &Action) -> HuResult<Vec<NodeId>> {
        match target {
            Target::Node(id) => Ok(vec![id]),
            Target::Function { owner, function } => match (function, self.tree.node(owner)?.payload) {
                (FunctionKind::Occupant, Slot::Appliance(a)) => Ok(self.appliances[a.index()]
                    .occupant()
                    .map(|agent| self.agents[agent.index()].node)
                    .into_iter()
                    .collect()),
                (FunctionKind::AllAgents, Slot::Unit(u)) => {
                    Ok(self.units[u.index()].agents.iter().map(|a| self.agents[a.index()].node).collect())
                }
                _ => Err(HuError::unsupported(action.to_string(), format!("`{}`", function.keyword()))),
            },
        }
    }

    fn dispatch(
        &mut self,
        node: NodeId,
        action: &Action,
        payload: &EffectPayload,
        time_start: Option<SimTime>,
        now: SimTime,
    ) -> HuResult<()> {
        let slot = self.tree.node(node)?.payload;
        match (action, slot) {
            (Action::Child { child, action }, _) => {
                let next = self.tree.child(node, child).ok_or_else(|| HuError::Resolution {
                    path:   child.clone(),
                    origin: self.tree.path_of(node).to_string(),
                    reason: "no such child".into(),
                })?;
                self.dispatch(next, action, payload, time_start, now)
            }
            (Action::EventActivate, Slot::Event(e)) => {
                self.events[e.index()].active = true;
                Ok(())
            }
            (Action::EventDeactivate, Slot::Event(e)) => {
                self.events[e.index()].active = false;
                Ok(())
            }
            (Action::ActivateEvent(name), _) => self.set_event_active(node, name, true),
            (Action::DeactivateEvent(name), _) => self.set_event_active(node, name, false),
            (Action::HabitAdd, Slot::Agent(a)) => {
                let EffectPayload::Template(template) = payload else {
                    return Err(payload_mismatch(action));
                };
                let start = time_start.unwrap_or(now);
                let habit = template.instantiate(start, start + template.length, self.tick_len);
                self.agents[a.index()].habits.add(habit);
                Ok(())
            }
            (Action::HabitDelete, Slot::Agent(a)) => {
                let EffectPayload::Name(name) = payload else {
                    return Err(payload_mismatch(action));
                };
                self.agents[a.index()].habits.remove_matching(name);
                Ok(())
            }
            (Action::PatternAdd, Slot::Appliance(a)) => {
                let EffectPayload::Pattern(pattern) = payload else {
                    return Err(payload_mismatch(action));
                };
                self.appliances[a.index()].add_pattern(pattern.clone());
                Ok(())
            }
            (Action::PatternDelete, Slot::Appliance(a)) => {
                let EffectPayload::Name(name) = payload else {
                    return Err(payload_mismatch(action));
                };
                self.appliances[a.index()].remove_pattern(name);
                Ok(())
            }
            (Action::StorageEmpty, Slot::Storage(s)) => {
                self.storages[s.index()].empty();
                Ok(())
            }
            (Action::StorageAddVolume, Slot::Storage(s)) => {
                let amount = match payload {
                    EffectPayload::Number(n) => *n,
                    EffectPayload::Distribution(d) => self.sample(d, now)?,
                    _ => return Err(payload_mismatch(action)),
                };
                self.storages[s.index()].add_volume(amount);
                Ok(())
            }
            (Action::StorageSetRandom, Slot::Storage(s)) => {
                let EffectPayload::Distribution(d) = payload else {
                    return Err(payload_mismatch(action));
                };
                let volume = self.sample(d, now)?;
                self.storages[s.index()].set_volume(volume);
                Ok(())
            }
            (Action::ElapsedReset, Slot::Elapsed(e)) => {
                let at = match payload {
                    EffectPayload::Time(t) => *t,
                    _ => now,
                };
                self.elapsed[e.index()].reset(at);
                Ok(())
            }
            (action, _) => Err(HuError::unsupported(action.to_string(), format!("`{}`", self.tree.path_of(node)))),
        }
    }

    fn set_event_active(&mut self, owner: NodeId, name: &str, active: bool) -> HuResult<()> {
        let local_id = format!("$event_{name}");
        match self.tree.child(owner, &local_id).map(|id| self.tree.node(id).map(|n| n.payload)) {
            Some(Ok(Slot::Event(e))) => {
                self.events[e.index()].active = active;
                Ok(())
            }
            Some(Err(err)) => Err(err),
            _ => Err(HuError::Resolution {
                path:   local_id,
                origin: self.tree.path_of(owner).to_string(),
                reason: "no such event".into(),
            }),
        }
    }

    fn sample(&mut self, dist: &Distribution, now: SimTime) -> HuResult<f64> {
        let mut dist = dist.clone();
        let src = Scope::new(&self.tree, &self.storages, &self.elapsed, now);
        dist.sample(&mut self.rng, &src, now)
    }

    // ── Event scan ────────────────────────────────────────────────────────

    /// Check every Probability and Switch event in tree order.  Returns how
    /// many fired.
    pub fn scan_events(&mut self, now: SimTime) -> HuResult<usize> {
        let mut fired = 0;
        for i in 0..self.scan.len() {
            match self.scan[i] {
                Scan::Event(e) => fired += usize::from(self.check_event(e, now)?),
                Scan::ActiveState(a) => {
                    let count = self.agents[a.index()].lifecycle.current().events.len();
                    for k in 0..count {
                        let e = self.agents[a.index()].lifecycle.current().events[k];
                        fired += usize::from(self.check_event(e, now)?);
                    }
                }
            }
        }
        Ok(fired)
    }

    fn check_event(&mut self, id: EventId, now: SimTime) -> HuResult<bool> {
        let src = Scope::new(&self.tree, &self.storages, &self.elapsed, now);
        let event = &mut self.events[id.index()];
        if event.check(&mut self.rng, &src, now)? {
            event.fire(id, &mut self.queue, None);
            return Ok(true);
        }
        Ok(false)
    }

    // ── Ledgers ───────────────────────────────────────────────────────────

    pub fn update_ledgers(&mut self, now: SimTime) {
        for storage in &mut self.storages {
            storage.update(now);
        }
    }

    // ── Consumer units ────────────────────────────────────────────────────

    /// One unit's share of a tick: pattern updates, then lifecycle, pruning
    /// and want draws for each agent in list order, then grants in the same
    /// order.  Returns the number of grants.
    pub fn step_unit(&mut self, unit: CuId, now: SimTime) -> HuResult<usize> {
        let cu = &self.units[unit.index()];

        for &room in &cu.rooms {
            for &a in &self.rooms[room.index()].appliances {
                self.appliances[a.index()].update(now);
            }
        }

        for &a in &cu.agents {
            let src = Scope::new(&self.tree, &self.storages, &self.elapsed, now);
            let agent = &mut self.agents[a.index()];
            if let Some(t) = agent.step(now, self.sim_start, self.tick_len, &mut self.rng, &src)? {
                if let Some(left) = agent.lifecycle.habit(t.left) {
                    fire_activations(&self.events, &left.events, &mut self.queue, None);
                }
            }
            agent.draw_wants(&cu.classes, now, self.tick_len, &mut self.rng, &src)?;
        }

        let mut grants = 0;
        for &a in &cu.agents {
            let agent = &mut self.agents[a.index()];
            if let Some(grant) = grant_next(a, &mut agent.wants, &cu.pool, &mut self.appliances, now) {
                let events = &self.appliances[grant.appliance.index()].events;
                fire_activations(&self.events, events, &mut self.queue, Some(grant.blocked_until));
                grants += 1;
            }
        }
        Ok(grants)
    }

    // ── Recording ─────────────────────────────────────────────────────────

    /// Refresh every registered series from the current state.
    pub fn refresh_series(&mut self, now: SimTime) {
        for series in &mut self.series {
            match series.source {
                SeriesSource::Demand(a) => {
                    let appliance = &self.appliances[a.index()];
                    let demand = appliance.demand();
                    for (value, column) in series.values.iter_mut().zip(&series.header) {
                        *value = appliance
                            .demand_types()
                            .iter()
                            .position(|t| t == column)
                            .map_or(0.0, |i| demand[i]);
                    }
                }
                SeriesSource::Activation(a) => {
                    series.values[0] = f64::from(u8::from(self.appliances[a.index()].take_activation()));
                }
                SeriesSource::Wants(a) => {
                    let wants = self.agents[a.index()].last_wants();
                    for (i, value) in series.values.iter_mut().enumerate() {
                        *value = wants.get(i).copied().unwrap_or(0.0);
                    }
                }
                SeriesSource::Busy(a) => {
                    let state = &self.agents[a.index()].wants;
                    let busy = state.busy_until().is_some_and(|until| until > now);
                    series.values[0] = f64::from(u8::from(busy));
                    series.values[1] = state.queue().count() as f64;
                }
                SeriesSource::Storage(s) => series.values[0] = self.storages[s.index()].volume(),
                SeriesSource::Elapsed(e) => series.values[0] = self.elapsed[e.index()].elapsed_secs(now) as f64,
            }
        }
    }
}

fn payload_mismatch(action: &Action) -> HuError {
    HuError::InvariantViolation(format!("payload does not fit `{action}`"))
}
