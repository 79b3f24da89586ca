//! Fluent builder turning [`ScenarioData`] into a ready-to-run [`Sim`].
//!
//! Building happens in three passes:
//!
//! 1. **Load**: walk the records top-down, registering tree nodes and arena
//!    entries in scenario order.  Actions are parsed and payloads checked
//!    here, so vocabulary errors surface before anything runs.
//! 2. **Connect**: resolve every effect target and every function payload
//!    once, against the complete tree.
//! 3. **Start**: put every agent into its `initial` state at the start time.

use tracing::info;

use huum_appliance::{Appliance, UsagePattern};
use huum_core::{
    AgentId, ApplianceId, Bound, CuId, ElapsedId, EventId, HuError, HuResult, NodeId, RoomId, SimConfig,
    SimTime, StorageId, Table1d,
};
use huum_event::{Action, EffectPayload, Event, EventEffect, EventKind};
use huum_habit::{
    Alternative, Condition, Distribution, FunctionSlot, HabitKind, HabitPayload, HabitSet, Lifecycle,
    LifecycleHabit, NextStatus, TemplateKind, UsageHabit, UsageHabitTemplate,
};
use huum_tree::NodeKind;

use crate::data::*;
use crate::observer::{Series, SeriesKind, SeriesSource};
use crate::world::{ConsumerUnit, Room, Scan, Scope, Slot};
use crate::{Agent, ElapsedTime, Rate, Sim, SimError, SimResult, Storage, World};

/// Fluent builder for [`Sim`].
///
/// # Optional overrides
///
/// | Method        | Default                        |
/// |---------------|--------------------------------|
/// | `.seed(s)`    | `settings.seed`                |
/// | `.output(o)`  | `settings.output`              |
///
/// # Example
///
/// ```rust,ignore
/// let data = ScenarioData::load("scenario.toml")?;
/// let mut sim = SimBuilder::new(data).seed(7).build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    data:   ScenarioData,
    seed:   Option<u64>,
    output: Option<OutputSettings>,
}

impl SimBuilder {
    pub fn new(data: ScenarioData) -> Self {
        Self { data, seed: None, output: None }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn output(mut self, output: OutputSettings) -> Self {
        self.output = Some(output);
        self
    }

    /// Validate the settings, build and connect the world, and start it.
    pub fn build(self) -> SimResult<Sim> {
        let settings = &self.data.settings;
        let tick_secs = u32::try_from(settings.time_step)
            .map_err(|_| SimError::Config(format!("time step {} is out of range", settings.time_step)))?;
        let config = SimConfig {
            start: SimTime::parse(&settings.start)?,
            end: SimTime::parse(&settings.end)?,
            tick_secs,
            seed: self.seed.unwrap_or(settings.seed),
        };
        config.validate()?;
        let output = self.output.unwrap_or_else(|| settings.output.clone());

        let mut loader = Loader { config, world: World::new(config.start, config.tick_len(), config.seed) };
        loader.model(&self.data.model)?;
        loader.connect()?;
        loader.register_series(&output);
        let mut world = loader.world;
        world.start(config.start)?;

        info!(
            target: "huum::sim",
            title = %settings.title,
            nodes = world.tree.len(),
            units = world.units.len(),
            agents = world.agents.len(),
            appliances = world.appliances.len(),
            events = world.events.len(),
            "scenario loaded"
        );
        Ok(Sim::new(config, world, output, settings.title.clone()))
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

struct Loader {
    config: SimConfig,
    world:  World,
}

impl Loader {
    fn time(&self, s: &str) -> HuResult<SimTime> {
        match s.trim() {
            "$model_start" => Ok(self.config.start),
            "$model_end" => Ok(self.config.end),
            other => SimTime::parse(other),
        }
    }

    fn tick_len(&self) -> i64 {
        self.config.tick_len()
    }

    fn node(&mut self, parent: NodeId, kind: NodeKind, name: &str, slot: Slot) -> HuResult<NodeId> {
        self.world.tree.add_child(parent, kind, name, slot)
    }

    // ── Levels ────────────────────────────────────────────────────────────

    fn model(&mut self, data: &ModelData) -> HuResult<()> {
        let root = self.world.tree.add_root(NodeKind::Model, &data.name, Slot::Model)?;
        self.holders(root, &data.events, &data.storages, &data.passed_times)?;
        for holding in &data.holdings {
            self.holding(root, holding)?;
        }
        Ok(())
    }

    fn holding(&mut self, parent: NodeId, data: &HoldingData) -> HuResult<()> {
        let node = self.node(parent, NodeKind::Holding, &data.name, Slot::Holding)?;
        self.world.holdings.push(node);
        self.holders(node, &data.events, &data.storages, &data.passed_times)?;
        for unit in &data.consumer_units {
            self.unit(node, unit)?;
        }
        Ok(())
    }

    fn unit(&mut self, parent: NodeId, data: &ConsumerUnitData) -> HuResult<()> {
        let id = CuId::try_from(self.world.units.len()).map_err(|_| HuError::defect("too many consumer units"))?;
        let node = self.node(parent, NodeKind::ConsumerUnit, &data.name, Slot::Unit(id))?;
        self.world.units.push(ConsumerUnit {
            node,
            name: data.name.to_lowercase(),
            rooms: Vec::new(),
            agents: Vec::new(),
            pool: Default::default(),
            classes: Vec::new(),
        });
        self.holders(node, &data.events, &data.storages, &data.passed_times)?;
        for room in &data.rooms {
            self.room(node, id, room)?;
        }
        for agent in &data.agents {
            self.agent(node, id, agent)?;
        }
        let cu = &mut self.world.units[id.index()];
        cu.classes = cu.pool.classes().map(str::to_string).collect();
        Ok(())
    }

    fn room(&mut self, parent: NodeId, unit: CuId, data: &RoomData) -> HuResult<()> {
        let id = RoomId::try_from(self.world.rooms.len()).map_err(|_| HuError::defect("too many rooms"))?;
        let node = self.node(parent, NodeKind::Room, &data.name, Slot::Room(id))?;
        self.world.rooms.push(Room { node, name: data.name.to_lowercase(), appliances: Vec::new() });
        self.world.units[unit.index()].rooms.push(id);
        self.holders(node, &data.events, &data.storages, &data.passed_times)?;
        for appliance in &data.appliances {
            self.appliance(node, unit, id, appliance)?;
        }
        Ok(())
    }

    fn appliance(&mut self, parent: NodeId, unit: CuId, room: RoomId, data: &ApplianceData) -> HuResult<()> {
        let id = ApplianceId::try_from(self.world.appliances.len())
            .map_err(|_| HuError::defect("too many appliances"))?;
        let node = self.node(parent, NodeKind::Appliance, &data.name, Slot::Appliance(id))?;
        let class = data.class.as_deref().unwrap_or(&data.name);
        let mut appliance = Appliance::new(node, &data.name, class, data.block_length, data.block_user);
        for pattern in &data.usage_patterns {
            appliance.add_pattern(self.pattern(pattern)?);
        }
        let class = appliance.class.clone();
        self.world.appliances.push(appliance);
        self.world.rooms[room.index()].appliances.push(id);
        self.world.units[unit.index()].pool.add(&class, id);
        let events = self.holders(node, &data.events, &data.storages, &data.passed_times)?;
        self.world.appliances[id.index()].events = events;
        Ok(())
    }

    fn agent(&mut self, parent: NodeId, unit: CuId, data: &AgentData) -> HuResult<()> {
        let id = AgentId::try_from(self.world.agents.len()).map_err(|_| HuError::defect("too many agents"))?;
        let node = self.node(parent, NodeKind::Agent, &data.name, Slot::Agent(id))?;
        let events = self.holders(node, &data.events, &data.storages, &data.passed_times)?;

        let mut states = Vec::with_capacity(data.lifecycle.len());
        for (index, state) in data.lifecycle.iter().enumerate() {
            states.push(self.lifecycle_habit(node, id, index, state)?);
        }
        let lifecycle = Lifecycle::new(states)?;

        let mut habits = HabitSet::new();
        for habit in &data.usage_habits {
            habits.add(self.usage_habit(node, id, habit)?);
        }
        for template in &data.templates {
            habits.add_template(self.template(template)?);
        }

        let mut agent = Agent::new(node, &data.name, unit, lifecycle, habits);
        agent.events = events;
        self.world.agents.push(agent);
        self.world.units[unit.index()].agents.push(id);
        self.world.scan.push(Scan::ActiveState(id));
        Ok(())
    }

    fn lifecycle_habit(
        &mut self,
        agent_node: NodeId,
        agent: AgentId,
        index: usize,
        data: &LifecycleData,
    ) -> HuResult<LifecycleHabit> {
        let node = self.node(agent_node, NodeKind::LifecycleHabit, &data.key, Slot::Lifecycle { agent, index })?;
        let alternatives = data
            .alternatives
            .iter()
            .map(|a| {
                Ok(Alternative {
                    condition: Condition::parse(&a.variable, &a.operator, &a.value)?,
                    target:    a.target.trim().to_lowercase(),
                })
            })
            .collect::<HuResult<Vec<_>>>()?;
        let activation = self.distribution(&data.activation, node)?;
        // lifecycle events are scanned only while their state is active
        let events = self.events(node, &data.events, false)?;
        let key = data.key.trim().to_lowercase();
        Ok(LifecycleHabit {
            status: data.status.as_deref().map_or_else(|| key.clone(), |s| s.trim().to_lowercase()),
            key,
            min_duration: data.min_duration,
            activation,
            next: NextStatus { alternatives, default: data.next.trim().to_lowercase() },
            node,
            events,
        })
    }

    fn usage_habit(&mut self, agent_node: NodeId, agent: AgentId, data: &UsageHabitData) -> HuResult<UsageHabit> {
        let node = self.node(agent_node, NodeKind::UsageHabit, &data.name, Slot::UsageHabit(agent))?;
        let start = self.time(&data.start)?;
        let end = self.time(&data.end)?;
        if end < start {
            return Err(HuError::defect(format!("usage habit `{}` ends before it starts", data.name)));
        }
        let payload = match &data.payload {
            HabitPayloadData::Constant { value } => HabitPayload::Constant(*value),
            HabitPayloadData::Table { x, y } => {
                let curve = Table1d::clamped(x.clone(), y.clone())?;
                let tick = self.tick_len();
                let count = ((end - start).max(0) as u64).div_ceil(tick as u64) as usize;
                HabitPayload::Table(curve.resample(tick as f64, count))
            }
            HabitPayloadData::Function { path } => HabitPayload::Function(FunctionSlot::new(node, path)),
        };
        Ok(UsageHabit::new(
            &data.name,
            &data.appliance,
            start,
            end,
            HabitKind::parse(&data.kind)?,
            data.guard.clone(),
            payload,
        ))
    }

    fn template(&self, data: &TemplateData) -> HuResult<UsageHabitTemplate> {
        UsageHabitTemplate::new(
            &data.name,
            &data.appliance,
            data.guard.as_deref().map(|g| g.trim().to_lowercase()),
            TemplateKind::parse(&data.kind)?,
            data.length,
            data.buffer,
            HabitKind::parse(&data.combine)?,
            Table1d::clamped(data.x.clone(), data.y.clone())?,
        )
    }

    fn pattern(&self, data: &PatternData) -> HuResult<UsagePattern> {
        let curve = Table1d::clamped(data.x.clone(), data.y.clone())?;
        UsagePattern::new(&data.name, &data.demand_type, &curve, self.tick_len())
    }

    fn distribution(&self, data: &DistributionData, origin: NodeId) -> HuResult<Distribution> {
        let dist = match data {
            DistributionData::Constant { value } => Distribution::Constant(*value),
            DistributionData::Uniform { from, to } => Distribution::Uniform { from: *from, to: *to },
            DistributionData::Gaussian { mu, sigma } => Distribution::Gaussian { mu: *mu, sigma: *sigma },
            DistributionData::Function { path } => Distribution::Function(FunctionSlot::new(origin, path)),
        };
        dist.validate()?;
        Ok(dist)
    }

    // ── Holders ───────────────────────────────────────────────────────────

    /// Register a node's events (scanned every tick), storages and
    /// elapsed-time trackers.  Returns the event ids.
    fn holders(
        &mut self,
        owner: NodeId,
        events: &[EventData],
        storages: &[StorageData],
        elapsed: &[ElapsedData],
    ) -> HuResult<Vec<EventId>> {
        let ids = self.events(owner, events, true)?;
        for data in storages {
            self.storage(owner, data)?;
        }
        for data in elapsed {
            self.elapsed(owner, data)?;
        }
        Ok(ids)
    }

    fn events(&mut self, owner: NodeId, data: &[EventData], scanned: bool) -> HuResult<Vec<EventId>> {
        let mut ids = Vec::with_capacity(data.len());
        for event in data {
            let id = EventId::try_from(self.world.events.len()).map_err(|_| HuError::defect("too many events"))?;
            let node = self.node(owner, NodeKind::Event, &event.name, Slot::Event(id))?;
            let kind = EventKind::parse(&event.kind)?;
            let mut built = Event::new(node, &event.name, kind);
            built.switch = event.switch;
            built.active = event.active;
            built.probability = event.probability.as_ref().map(|d| self.distribution(d, node)).transpose()?;
            if kind == EventKind::Probability && built.probability.is_none() {
                return Err(HuError::defect(format!("probability event `{}` has no probability", event.name)));
            }
            for effect in &event.effects {
                let action = Action::parse(&effect.action)?;
                let payload = self.effect_payload(effect, node)?;
                built.effects.push(EventEffect::new(node, &effect.target, action, payload)?);
            }
            self.world.events.push(built);
            if scanned {
                self.world.scan.push(Scan::Event(id));
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn effect_payload(&self, data: &EffectData, origin: NodeId) -> HuResult<EffectPayload> {
        let mut set = Vec::new();
        if let Some(name) = &data.name {
            set.push(EffectPayload::Name(name.trim().to_lowercase()));
        }
        if let Some(template) = &data.template {
            set.push(EffectPayload::Template(self.template(template)?));
        }
        if let Some(pattern) = &data.pattern {
            set.push(EffectPayload::Pattern(self.pattern(pattern)?));
        }
        if let Some(dist) = &data.distribution {
            set.push(EffectPayload::Distribution(self.distribution(dist, origin)?));
        }
        if let Some(number) = data.number {
            set.push(EffectPayload::Number(number));
        }
        if let Some(time) = &data.time {
            set.push(EffectPayload::Time(self.time(time)?));
        }
        match set.len() {
            0 => Ok(EffectPayload::None),
            1 => Ok(set.remove(0)),
            _ => Err(HuError::defect(format!(
                "effect `{}` on `{}` sets more than one payload",
                data.action, data.target
            ))),
        }
    }

    fn translator(data: &TranslatorData) -> HuResult<Table1d> {
        Table1d::new(data.x.clone(), data.y.clone(), Bound::parse(&data.above)?, Bound::parse(&data.below)?)
    }

    fn storage(&mut self, owner: NodeId, data: &StorageData) -> HuResult<()> {
        let id = StorageId::try_from(self.world.storages.len()).map_err(|_| HuError::defect("too many storages"))?;
        let node = self.node(owner, NodeKind::Storage, &data.name, Slot::Storage(id))?;
        let mut storage = Storage::new(node, &data.name, data.initial_volume);
        for t in &data.translators {
            storage.translators.add(&t.active_for, Self::translator(t)?)?;
        }
        storage.translators.check(&data.name)?;
        for rate in &data.rates {
            storage.add_rate(Rate {
                name:     rate.name.to_lowercase(),
                per_tick: rate.value,
                start:    self.time(&rate.start)?,
                end:      self.time(&rate.end)?,
            });
        }
        self.world.storages.push(storage);
        Ok(())
    }

    fn elapsed(&mut self, owner: NodeId, data: &ElapsedData) -> HuResult<()> {
        let id = ElapsedId::try_from(self.world.elapsed.len()).map_err(|_| HuError::defect("too many trackers"))?;
        let node = self.node(owner, NodeKind::ElapsedTime, &data.name, Slot::Elapsed(id))?;
        let mut tracker = ElapsedTime::new(node, &data.name, self.time(&data.start)?);
        for t in &data.translators {
            tracker.translators.add(&t.active_for, Self::translator(t)?)?;
        }
        tracker.translators.check(&data.name)?;
        self.world.elapsed.push(tracker);
        Ok(())
    }

    // ── Connect ───────────────────────────────────────────────────────────

    /// Resolve every effect target and function payload against the full
    /// tree.
    fn connect(&mut self) -> HuResult<()> {
        let world = &mut self.world;
        let src = Scope::new(&world.tree, &world.storages, &world.elapsed, self.config.start);
        for event in &mut world.events {
            for effect in &mut event.effects {
                effect.connect(&world.tree)?;
                if let EffectPayload::Distribution(d) = &mut effect.payload {
                    d.bind(&src)?;
                }
            }
            if let Some(p) = &mut event.probability {
                p.bind(&src)?;
            }
        }
        for agent in &mut world.agents {
            for state in agent.lifecycle.habits_mut() {
                state.activation.bind(&src)?;
            }
            agent.habits.bind(&src)?;
        }
        Ok(())
    }

    // ── Series ────────────────────────────────────────────────────────────

    fn register_series(&mut self, output: &OutputSettings) {
        let world = &mut self.world;
        let mut series = Vec::new();
        let mut push = |kind, node: NodeId, label: &str, header: Vec<String>, source| {
            series.push(Series {
                kind,
                path: world.tree.path_of(node).to_string(),
                label: label.to_string(),
                values: vec![0.0; header.len()],
                header,
                source,
            });
        };
        for (i, a) in world.appliances.iter().enumerate() {
            let id = ApplianceId(i as u32);
            if output.appliance_demand {
                push(SeriesKind::ApplianceDemand, a.node, &a.name, a.demand_types().to_vec(), SeriesSource::Demand(id));
            }
            if output.appliance_activation {
                push(
                    SeriesKind::ApplianceActivation,
                    a.node,
                    &a.name,
                    vec!["activated".into()],
                    SeriesSource::Activation(id),
                );
            }
        }
        for (i, a) in world.agents.iter().enumerate() {
            let id = AgentId(i as u32);
            if output.agent_wants {
                let classes = world.units[a.unit.index()].classes.clone();
                push(SeriesKind::AgentWants, a.node, &a.name, classes, SeriesSource::Wants(id));
            }
            if output.agent_busy {
                push(
                    SeriesKind::AgentBusy,
                    a.node,
                    &a.name,
                    vec!["busy".into(), "queued".into()],
                    SeriesSource::Busy(id),
                );
            }
        }
        if output.storages {
            for (i, s) in world.storages.iter().enumerate() {
                push(SeriesKind::Storage, s.node, &s.name, vec!["volume".into()], SeriesSource::Storage(StorageId(i as u32)));
            }
        }
        if output.elapsed_times {
            for (i, e) in world.elapsed.iter().enumerate() {
                push(
                    SeriesKind::ElapsedTime,
                    e.node,
                    &e.name,
                    vec!["elapsed_secs".into()],
                    SeriesSource::Elapsed(ElapsedId(i as u32)),
                );
            }
        }
        world.series = series;
    }
}
