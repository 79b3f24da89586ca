//! Unit tests for huum-sim.

use huum_core::{AgentId, HuError, SimTime, Tick};

use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

const T0: SimTime = SimTime(1_614_556_800);

const HEAD: &str = r#"
[settings]
title = "flat"
start = "2021-03-01 00:00"
end = "2021-03-02 00:00"
time_step = 60
seed = 42

[settings.output]
filter = "all"
agent_wants = true
agent_busy = true
storages = true
elapsed_times = true

[model]
name = "town"

[[model.holdings]]
name = "h1"

[[model.holdings.storages]]
name = "tank"
initial_volume = 10.0
[[model.holdings.storages.translators]]
active_for = "default"
x = [0.0, 100.0]
y = [0.0, 1.0]

[[model.holdings.passed_times]]
name = "since_start"
[[model.holdings.passed_times.translators]]
active_for = "default"
x = [0.0, 3600.0]
y = [0.0, 1.0]

[[model.holdings.consumer_units]]
name = "flat"

[[model.holdings.consumer_units.rooms]]
name = "kitchen"
[[model.holdings.consumer_units.rooms.appliances]]
name = "kettle"
block_length = 120

[[model.holdings.consumer_units.rooms]]
name = "bath"
[[model.holdings.consumer_units.rooms.appliances]]
name = "shower"
block_length = 60
[[model.holdings.consumer_units.rooms.appliances.usage_patterns]]
name = "water"
demand_type = "water"
x = [0.0, 240.0]
y = [8.0, 8.0]
[[model.holdings.consumer_units.rooms.appliances.events]]
name = "used"
kind = "activate"
[[model.holdings.consumer_units.rooms.appliances.events.effects]]
target = "$appliance.$replace_user"
action = "probability.add"
template = { name = "after_shower", appliance = "kettle", kind = "start", combine = "add", length = 600, x = [0.0], y = [0.5] }
"#;

const WOKE: &str = r#"
[[model.holdings.consumer_units.agents.lifecycle.events]]
name = "woke"
kind = "activate"
[[model.holdings.consumer_units.agents.lifecycle.events.effects]]
target = "$holding.$storage_tank"
action = "storage.add_volume"
number = 1.0
"#;

const WASH: &str = r#"
[[model.holdings.consumer_units.agents.usage_habits]]
name = "wash"
appliance = "shower"
kind = "add"
guard = "awake"
payload = { type = "constant", value = 1.0 }
"#;

/// Sleeps until 07:00, awake until 22:00, then asleep until 07:00 again.
fn agent(name: &str, initial_events: &str, habits: &str) -> String {
    format!(
        r#"
[[model.holdings.consumer_units.agents]]
name = "{name}"

[[model.holdings.consumer_units.agents.lifecycle]]
key = "initial"
status = "sleep"
activation = {{ kind = "constant", value = 25200.0 }}
next = "awake"
{initial_events}
[[model.holdings.consumer_units.agents.lifecycle]]
key = "awake"
activation = {{ kind = "constant", value = 25200.0 }}
next = "night"

[[model.holdings.consumer_units.agents.lifecycle]]
key = "night"
status = "sleep"
activation = {{ kind = "constant", value = 79200.0 }}
next = "awake"

[[model.holdings.consumer_units.agents.usage_habits]]
name = "tea"
appliance = "kettle"
kind = "add"
guard = "awake"
payload = {{ type = "constant", value = 1.0 }}
{habits}"#
    )
}

/// Two agents sharing a kettle; only alice showers.  `extra` is appended
/// verbatim, so it may continue alice's habit list.
fn scenario(extra: &str) -> String {
    format!("{HEAD}{}{}{extra}", agent("bob", WOKE, ""), agent("alice", "", WASH))
}

fn build(extra: &str) -> SimResult<Sim> {
    SimBuilder::new(ScenarioData::from_toml_str(&scenario(extra))?).build()
}

fn sim(extra: &str) -> Sim {
    build(extra).unwrap()
}

fn at(s: &str) -> SimTime {
    SimTime::parse(s).unwrap()
}

fn tank(sim: &Sim) -> f64 {
    sim.world.storage("tank").unwrap().volume()
}

/// Keeps every snapshot as `(tick, [(kind, label, values)])`.
#[derive(Default)]
struct Recorder {
    rows:     Vec<(Tick, Vec<(SeriesKind, String, Vec<f64>)>)>,
    executed: usize,
    ended:    Option<SimTime>,
}

impl Recorder {
    fn value(&self, tick: u64, kind: SeriesKind, label: &str) -> &[f64] {
        let (_, series) = self.rows.iter().find(|(t, _)| t.0 == tick).unwrap();
        &series.iter().find(|(k, l, _)| *k == kind && l == label).unwrap().2
    }
}

impl SimObserver for Recorder {
    fn on_tick_end(&mut self, _tick: Tick, executed: usize) {
        self.executed += executed;
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        let series = snapshot.series.iter().map(|s| (s.kind, s.label.clone(), s.values.clone())).collect();
        self.rows.push((snapshot.tick, series));
    }

    fn on_sim_end(&mut self, now: SimTime) {
        self.ended = Some(now);
    }
}

const FILL: &str = r#"
[[model.holdings.events]]
name = "fill"
kind = "switch"
switch = true
[[model.holdings.events.effects]]
target = "$storage_tank"
action = "storage.add_volume"
number = 2.0
"#;

// ── Building ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn loads_the_tree_and_arenas() {
        let sim = sim("");
        let world = &sim.world;
        assert_eq!(sim.title, "flat");
        assert_eq!(world.holdings.len(), 1);
        assert_eq!(world.units.len(), 1);
        assert_eq!(world.rooms.len(), 2);
        assert_eq!(world.appliances.len(), 2);
        assert_eq!(world.agents.len(), 2);
        // shower's activation event plus bob's exit event
        assert_eq!(world.events.len(), 2);
        assert_eq!(world.units[0].classes, vec!["kettle".to_string(), "shower".to_string()]);
        assert_eq!(world.units[0].agents, vec![AgentId(0), AgentId(1)]);

        let bob = world.agent("Bob").unwrap();
        assert_eq!(world.tree.path_of(bob.node), "$model_town.$holding_h1.$cu_flat.$agent_bob");
        assert_eq!(world.appliance("shower").unwrap().pattern_block(), 300);
    }

    #[test]
    fn agents_start_in_initial() {
        let sim = sim("");
        let bob = sim.world.agent("bob").unwrap();
        assert_eq!(bob.lifecycle.current().key, "initial");
        assert_eq!(bob.lifecycle.status(), "sleep");
        assert_eq!(bob.lifecycle.next_change(), at("2021-03-01 07:00"));
    }

    #[test]
    fn series_follow_the_output_toggles() {
        let sim = sim("");
        let kinds: Vec<_> = sim.world.series().iter().map(|s| (s.kind, s.label.as_str())).collect();
        assert_eq!(kinds, vec![
            (SeriesKind::ApplianceDemand, "kettle"),
            (SeriesKind::ApplianceActivation, "kettle"),
            (SeriesKind::ApplianceDemand, "shower"),
            (SeriesKind::ApplianceActivation, "shower"),
            (SeriesKind::AgentWants, "bob"),
            (SeriesKind::AgentBusy, "bob"),
            (SeriesKind::AgentWants, "alice"),
            (SeriesKind::AgentBusy, "alice"),
            (SeriesKind::Storage, "tank"),
            (SeriesKind::ElapsedTime, "since_start"),
        ]);
        let shower = &sim.world.series()[2];
        assert_eq!(shower.header, vec!["water".to_string()]);
        assert!(sim.world.series()[0].header.is_empty());
        assert_eq!(sim.world.series()[4].header, vec!["kettle".to_string(), "shower".to_string()]);
    }

    #[test]
    fn output_override_replaces_the_settings() {
        let data = ScenarioData::from_toml_str(&scenario("")).unwrap();
        let output = OutputSettings { appliance_demand: false, appliance_activation: false, ..Default::default() };
        let sim = SimBuilder::new(data).output(output.clone()).build().unwrap();
        assert!(sim.world.series().is_empty());
        assert_eq!(sim.output, output);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = scenario("").replacen("name = \"kettle\"", "name = \"kettle\"\ncolour = \"red\"", 1);
        assert!(matches!(ScenarioData::from_toml_str(&text), Err(SimError::Toml(_))));
    }

    #[test]
    fn missing_initial_state_is_a_defect() {
        let text = scenario("").replacen("key = \"initial\"", "key = \"dawn\"", 1);
        let err = SimBuilder::new(ScenarioData::from_toml_str(&text).unwrap()).build().err().unwrap();
        assert!(matches!(err, SimError::Model(HuError::ScenarioDefect(_))), "{err}");
    }

    #[test]
    fn unknown_action_fails_at_load() {
        let extra = r#"
[[model.holdings.events]]
name = "boom"
kind = "switch"
[[model.holdings.events.effects]]
target = "$storage_tank"
action = "storage.explode"
"#;
        let err = build(extra).err().unwrap();
        assert!(matches!(err, SimError::Model(HuError::UnsupportedAction { .. })), "{err}");
    }

    #[test]
    fn unresolvable_target_fails_at_connect() {
        let extra = r#"
[[model.holdings.events]]
name = "drain"
kind = "switch"
[[model.holdings.events.effects]]
target = "$storage_missing"
action = "storage.empty"
"#;
        let err = build(extra).err().unwrap();
        assert!(matches!(err, SimError::Model(HuError::Resolution { .. })), "{err}");
    }

    #[test]
    fn two_payloads_are_a_defect() {
        let extra = r#"
[[model.holdings.events]]
name = "fill"
kind = "switch"
[[model.holdings.events.effects]]
target = "$storage_tank"
action = "storage.add_volume"
number = 1.0
distribution = { kind = "constant", value = 1.0 }
"#;
        let err = build(extra).err().unwrap();
        assert!(matches!(err, SimError::Model(HuError::ScenarioDefect(_))), "{err}");
    }

    #[test]
    fn probability_event_needs_a_probability() {
        let extra = r#"
[[model.holdings.events]]
name = "rain"
kind = "probability"
"#;
        let err = build(extra).err().unwrap();
        assert!(matches!(err, SimError::Model(HuError::ScenarioDefect(_))), "{err}");
    }

    #[test]
    fn function_payload_must_name_a_value_function() {
        let extra = r#"
[[model.holdings.consumer_units.agents.usage_habits]]
name = "mood"
appliance = "radio"
kind = "add"
payload = { type = "function", path = "$holding.$storage_tank" }
"#;
        let err = build(extra).err().unwrap();
        assert!(matches!(err, SimError::Model(HuError::Resolution { .. })), "{err}");
    }

    #[test]
    fn time_step_must_fit() {
        let text = scenario("").replacen("time_step = 60", "time_step = -60", 1);
        let err = SimBuilder::new(ScenarioData::from_toml_str(&text).unwrap()).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)), "{err}");
    }

    #[test]
    fn loads_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.toml");
        std::fs::write(&path, scenario("")).unwrap();
        let data = ScenarioData::load(&path).unwrap();
        assert_eq!(data.settings.time_step, 60);
        assert_eq!(data.model.holdings[0].consumer_units[0].agents.len(), 2);

        let missing = ScenarioData::load(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(SimError::Read { .. })));
    }
}

// ── Lifecycle and arbitration ─────────────────────────────────────────────────

#[cfg(test)]
mod tick_tests {
    use super::*;

    #[test]
    fn status_changes_on_the_activation_tick() {
        let mut sim = sim("");
        sim.run_ticks(419, &mut NoopObserver).unwrap();
        assert_eq!(sim.now(), at("2021-03-01 06:59"));
        assert_eq!(sim.world.agent("bob").unwrap().lifecycle.status(), "sleep");

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        let bob = sim.world.agent("bob").unwrap();
        assert_eq!(bob.lifecycle.current().key, "awake");
        assert_eq!(bob.lifecycle.next_change(), at("2021-03-01 22:00"));
    }

    #[test]
    fn night_rolls_over_to_the_next_morning() {
        let mut sim = sim("");
        sim.run_ticks(1320, &mut NoopObserver).unwrap();
        let bob = sim.world.agent("bob").unwrap();
        assert_eq!(bob.lifecycle.current().key, "night");
        assert_eq!(bob.lifecycle.next_change(), at("2021-03-02 07:00"));
    }

    #[test]
    fn exit_events_run_the_tick_after_the_change() {
        let mut sim = sim("");
        sim.run_ticks(420, &mut NoopObserver).unwrap();
        assert_eq!(tank(&sim), 10.0);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(tank(&sim), 11.0);
    }

    #[test]
    fn contention_grants_one_agent_per_appliance() {
        let mut sim = sim("");
        sim.run_ticks(420, &mut NoopObserver).unwrap();
        let world = &sim.world;
        let kettle = world.appliance("kettle").unwrap();
        let shower = world.appliance("shower").unwrap();
        assert_eq!(kettle.occupant(), Some(AgentId(0)));
        assert_eq!(kettle.blocked_until(), Some(at("2021-03-01 07:02")));
        // alice lost the kettle and got her second wish instead
        assert_eq!(shower.occupant(), Some(AgentId(1)));
        assert_eq!(shower.blocked_until(), Some(at("2021-03-01 07:05")));

        let alice = world.agent("alice").unwrap();
        assert_eq!(alice.wants.queue().collect::<Vec<_>>(), vec!["kettle"]);
        assert_eq!(alice.wants.busy_until(), Some(at("2021-03-01 07:01")));
        assert_eq!(world.agent("bob").unwrap().wants.queue().count(), 0);
    }

    #[test]
    fn activation_events_target_the_occupant() {
        let mut sim = sim("");
        sim.run_ticks(421, &mut NoopObserver).unwrap();
        let alice = sim.world.agent("alice").unwrap();
        let habit = alice.habits.habits().iter().find(|h| h.name == "after_shower").unwrap();
        assert_eq!(habit.start, at("2021-03-01 07:05"));
        assert_eq!(habit.end, at("2021-03-01 07:15"));
        let bob = sim.world.agent("bob").unwrap();
        assert!(bob.habits.habits().iter().all(|h| h.name != "after_shower"));
    }

    #[test]
    fn nobody_wants_anything_while_asleep() {
        let mut sim = sim("");
        sim.run_ticks(300, &mut NoopObserver).unwrap();
        for agent in &sim.world.agents {
            assert_eq!(agent.wants.queue().count(), 0);
            assert!(agent.last_wants().iter().all(|&p| p == 0.0));
        }
        assert!(sim.world.appliances.iter().all(|a| a.occupant().is_none()));
    }

    /// One agent who always wants the shower; its pattern outlasts the
    /// user block, so the next grant lands on the tick the shower frees.
    const BACK_TO_BACK: &str = r#"
[settings]
start = "2021-03-01 00:00"
end = "2021-03-01 00:10"
time_step = 60

[model]
name = "town"

[[model.holdings]]
name = "h1"

[[model.holdings.consumer_units]]
name = "flat"

[[model.holdings.consumer_units.rooms]]
name = "bath"
[[model.holdings.consumer_units.rooms.appliances]]
name = "shower"
block_length = 60
[[model.holdings.consumer_units.rooms.appliances.usage_patterns]]
name = "water"
demand_type = "water"
x = [0.0, 240.0]
y = [8.0, 8.0]

[[model.holdings.consumer_units.agents]]
name = "bob"
[[model.holdings.consumer_units.agents.lifecycle]]
key = "initial"
activation = { kind = "constant", value = 0.0 }
next = "initial"
[[model.holdings.consumer_units.agents.usage_habits]]
name = "wash"
appliance = "shower"
kind = "add"
payload = { type = "constant", value = 1.0 }
"#;

    #[test]
    fn regrant_on_the_freeing_tick_keeps_demand_continuous() {
        let data = ScenarioData::from_toml_str(BACK_TO_BACK).unwrap();
        let mut sim = SimBuilder::new(data).build().unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(rec.value(0, SeriesKind::ApplianceDemand, "shower"), [0.0]);
        for tick in 1..=10 {
            assert_eq!(rec.value(tick, SeriesKind::ApplianceDemand, "shower"), [8.0], "tick {tick}");
        }
        let grants: Vec<u64> = (1..=10)
            .filter(|&t| rec.value(t, SeriesKind::ApplianceActivation, "shower") == [1.0])
            .collect();
        assert_eq!(grants, vec![1, 6]);
    }
}

// ── Events and ledgers ────────────────────────────────────────────────────────

#[cfg(test)]
mod event_tests {
    use super::*;

    #[test]
    fn queued_effects_run_next_tick() {
        let mut sim = sim(FILL);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(tank(&sim), 10.0);
        assert_eq!(sim.world.queue.len(), 1);
        sim.run_ticks(4, &mut NoopObserver).unwrap();
        assert_eq!(tank(&sim), 18.0);
        assert_eq!(sim.world.executed(), 4);
    }

    #[test]
    fn self_deactivating_event_fires_once() {
        let extra = r#"
[[model.holdings.events]]
name = "once"
kind = "probability"
probability = { kind = "constant", value = 1.0 }
[[model.holdings.events.effects]]
target = "$storage_tank"
action = "storage.add_volume"
number = 5.0
[[model.holdings.events.effects]]
target = "$self"
action = "event.deactivate"
"#;
        let mut sim = sim(extra);
        sim.run_ticks(5, &mut NoopObserver).unwrap();
        assert_eq!(tank(&sim), 15.0);
        assert_eq!(sim.world.executed(), 2);
        let once = sim.world.events.iter().find(|e| e.name == "once").unwrap();
        assert!(!once.active);
    }

    #[test]
    fn named_event_switches_on_a_sibling() {
        let extra = r#"
[[model.holdings.events]]
name = "fill"
kind = "switch"
switch = true
active = false
[[model.holdings.events.effects]]
target = "$storage_tank"
action = "storage.add_volume"
number = 2.0

[[model.holdings.events]]
name = "starter"
kind = "switch"
switch = true
[[model.holdings.events.effects]]
target = "$holding"
action = "event.activate.fill"
"#;
        let mut sim = sim(extra);
        // tick 2 switches fill on before the scan reaches it
        sim.run_ticks(2, &mut NoopObserver).unwrap();
        assert_eq!(tank(&sim), 10.0);
        assert!(sim.world.events.iter().find(|e| e.name == "fill").unwrap().active);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(tank(&sim), 12.0);
    }

    #[test]
    fn unsupported_action_fails_at_execution() {
        let extra = r#"
[[model.holdings.events]]
name = "odd"
kind = "switch"
switch = true
[[model.holdings.events.effects]]
target = "$storage_tank"
action = "probability.del"
name = "tea"
"#;
        let mut sim = sim(extra);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        let err = sim.run_ticks(1, &mut NoopObserver).err().unwrap();
        assert!(matches!(err, SimError::Model(HuError::UnsupportedAction { .. })), "{err}");
    }

    #[test]
    fn habit_delete_reaches_every_agent() {
        let extra = r#"
[[model.holdings.consumer_units.events]]
name = "no_tea"
kind = "switch"
switch = true
[[model.holdings.consumer_units.events.effects]]
target = "$cu.$replace_all_agents"
action = "probability.del"
name = "tea"
"#;
        let mut sim = sim(extra);
        sim.run_ticks(2, &mut NoopObserver).unwrap();
        for agent in &sim.world.agents {
            assert!(agent.habits.habits().iter().all(|h| h.name != "tea"), "{}", agent.name);
        }
        let alice = sim.world.agent("alice").unwrap();
        assert!(alice.habits.habits().iter().any(|h| h.name == "wash"));
    }

    #[test]
    fn pattern_effects_edit_the_appliance() {
        let extra = r#"
[[model.holdings.events]]
name = "retrofit"
kind = "switch"
switch = true
[[model.holdings.events.effects]]
target = "$cu_flat.$room_kitchen.$appliance_kettle"
action = "usage_pattern.add"
pattern = { name = "boil", demand_type = "power", x = [0.0, 120.0], y = [2.0, 2.0] }
[[model.holdings.events.effects]]
target = "$cu_flat.$room_bath.$appliance_shower"
action = "usage_pattern.del"
name = "water"
"#;
        let mut sim = sim(extra);
        sim.run_ticks(2, &mut NoopObserver).unwrap();
        let kettle = sim.world.appliance("kettle").unwrap();
        assert_eq!(kettle.demand_types(), ["power".to_string()]);
        assert!(kettle.patterns().iter().any(|p| p.name == "boil"));
        assert!(sim.world.appliance("shower").unwrap().patterns().is_empty());
    }

    #[test]
    fn rates_apply_inside_their_window() {
        let extra = r#"
[[model.storages]]
name = "boiler"
[[model.storages.translators]]
active_for = "default"
x = [0.0]
y = [0.0]
[[model.storages.rates]]
name = "heat"
value = 0.5
start = "2021-03-01 00:10"
end = "2021-03-01 00:20"
"#;
        let mut sim = sim(extra);
        sim.run_ticks(9, &mut NoopObserver).unwrap();
        assert_eq!(sim.world.storage("boiler").unwrap().volume(), 0.0);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.world.storage("boiler").unwrap().volume(), 0.5);
        sim.run_ticks(20, &mut NoopObserver).unwrap();
        let boiler = sim.world.storage("boiler").unwrap();
        assert_eq!(boiler.volume(), 5.0);
        assert!(boiler.rates().is_empty());
    }

    #[test]
    fn passed_time_resets_to_now() {
        let extra = r#"
[[model.holdings.events]]
name = "reset"
kind = "switch"
switch = true
[[model.holdings.events.effects]]
target = "$passedtime_since_start"
action = "passed_time.empty"
"#;
        let mut sim = sim(extra);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.world.elapsed[0].elapsed_secs(sim.now()), 60);
        sim.run_ticks(9, &mut NoopObserver).unwrap();
        assert_eq!(sim.world.elapsed[0].reference(), T0 + 600);
        assert_eq!(sim.world.elapsed[0].elapsed_secs(sim.now()), 0);
    }

    #[test]
    fn function_payload_reads_a_storage() {
        let extra = r#"
[[model.holdings.consumer_units.agents.usage_habits]]
name = "mood"
appliance = "radio"
kind = "add"
payload = { type = "function", path = "$holding.$storage_tank.$get_value_function" }
"#;
        let sim = sim(extra);
        let alice = sim.world.agent("alice").unwrap();
        let scope = sim.world.scope(T0);
        let p = alice.habits.want_probability("radio", "sleep", T0, 60, &scope).unwrap();
        assert!((p - 0.1).abs() < 1e-9);
    }

    #[test]
    fn event_probability_can_read_elapsed_time() {
        // certain once an hour has passed
        let extra = r#"
[[model.holdings.events]]
name = "late"
kind = "probability"
probability = { kind = "function", path = "$holding.$passedtime_since_start.$get_value_function" }
[[model.holdings.events.effects]]
target = "$storage_tank"
action = "storage.empty"
"#;
        let mut sim = sim(extra);
        sim.run_ticks(61, &mut NoopObserver).unwrap();
        assert_eq!(tank(&sim), 0.0);
    }
}

// ── Runs ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn records_the_start_and_every_tick() {
        let mut sim = sim("");
        let mut rec = Recorder::default();
        sim.run_ticks(421, &mut rec).unwrap();
        assert_eq!(rec.rows.len(), 422);
        assert_eq!(rec.rows[0].0, Tick(0));

        assert_eq!(rec.value(420, SeriesKind::ApplianceActivation, "kettle"), [1.0]);
        assert_eq!(rec.value(421, SeriesKind::ApplianceActivation, "kettle"), [0.0]);
        assert_eq!(rec.value(419, SeriesKind::ApplianceDemand, "shower"), [0.0]);
        assert_eq!(rec.value(420, SeriesKind::ApplianceDemand, "shower"), [8.0]);
        assert_eq!(rec.value(421, SeriesKind::ApplianceDemand, "shower"), [8.0]);
        assert_eq!(rec.value(420, SeriesKind::AgentWants, "alice"), [1.0, 1.0]);
        assert_eq!(rec.value(420, SeriesKind::AgentBusy, "bob"), [1.0, 0.0]);
        assert_eq!(rec.value(420, SeriesKind::AgentBusy, "alice"), [1.0, 1.0]);
        assert_eq!(rec.value(60, SeriesKind::ElapsedTime, "since_start"), [3600.0]);
        assert_eq!(rec.value(421, SeriesKind::Storage, "tank"), [11.0]);
        // bob's exit event ran in tick 421
        assert_eq!(rec.executed, 2);
    }

    #[test]
    fn full_run_reaches_the_end() {
        let mut sim = sim("");
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.rows.len(), 1441);
        assert_eq!(rec.ended, Some(at("2021-03-02 00:00")));
        assert!(sim.clock.is_finished());
        assert_eq!(sim.world.agent("alice").unwrap().lifecycle.status(), "sleep");
    }

    #[test]
    fn same_seed_same_run() {
        let extra = r#"
[[model.holdings.events]]
name = "rain"
kind = "probability"
probability = { kind = "uniform", from = 0.0, to = 1.0 }
[[model.holdings.events.effects]]
target = "$storage_tank"
action = "storage.add_volume"
distribution = { kind = "gaussian", mu = 1.0, sigma = 0.5 }
"#;
        let run = |seed: u64| {
            let data = ScenarioData::from_toml_str(&scenario(extra)).unwrap();
            let mut sim = SimBuilder::new(data).seed(seed).build().unwrap();
            let mut rec = Recorder::default();
            sim.run_ticks(600, &mut rec).unwrap();
            (tank(&sim), rec.rows)
        };
        let (a, rows_a) = run(7);
        let (b, rows_b) = run(7);
        assert_eq!(a, b);
        assert_eq!(rows_a, rows_b);
        let (c, _) = run(8);
        assert_ne!(a, c);
    }

    #[test]
    fn demo_scenario_runs_into_the_second_night() {
        let text = include_str!("../../../demos/household/scenario.toml");
        let mut sim = SimBuilder::new(ScenarioData::from_toml_str(text).unwrap()).build().unwrap();
        assert_eq!(sim.world.units[0].classes, ["kettle", "tap", "shower", "toilet", "washing_machine"]);
        // 03:00 on the second day
        sim.run_ticks(1620, &mut NoopObserver).unwrap();
        for agent in &sim.world.agents {
            assert_eq!(agent.lifecycle.status(), "sleep", "{}", agent.name);
        }
    }
}
