//! Agents: a lifecycle, a habit set and a want queue under one owner.

use tracing::trace;

use huum_appliance::WantState;
use huum_core::{CuId, EventId, HuResult, NodeId, SimRng, SimTime};
use huum_habit::{HabitSet, Lifecycle, Transition, ValueSource};

#[derive(Clone, Debug)]
pub struct Agent {
    pub node:      NodeId,
    pub name:      String,
    pub unit:      CuId,
    pub lifecycle: Lifecycle,
    pub habits:    HabitSet,
    pub wants:     WantState,
    pub events:    Vec<EventId>,
    /// Want probability per appliance class of the unit, from the last draw.
    last_wants:    Vec<f64>,
}

impl Agent {
    pub fn new(node: NodeId, name: impl Into<String>, unit: CuId, lifecycle: Lifecycle, habits: HabitSet) -> Self {
        Self {
            node,
            name: name.into().to_lowercase(),
            unit,
            lifecycle,
            habits,
            wants: WantState::new(),
            events: Vec::new(),
            last_wants: Vec::new(),
        }
    }

    /// Enter the `initial` state at the start of the run.
    pub fn start(
        &mut self,
        now: SimTime,
        sim_start: SimTime,
        tick_len: i64,
        rng: &mut SimRng,
        src: &dyn ValueSource,
    ) -> HuResult<()> {
        self.lifecycle.start(now, rng, src)?;
        self.habits.prune(now);
        self.habits.instantiate(self.lifecycle.status(), now, self.lifecycle.next_change(), sim_start, tick_len);
        Ok(())
    }

    /// Lifecycle check and pruning for one tick.
    ///
    /// On a transition the habit set is re-derived for the new status.
    pub fn step(
        &mut self,
        now: SimTime,
        sim_start: SimTime,
        tick_len: i64,
        rng: &mut SimRng,
        src: &dyn ValueSource,
    ) -> HuResult<Option<Transition>> {
        let transition = self.lifecycle.poll(now, rng, src)?;
        if transition.is_some() {
            self.habits.prune(now);
            let added = self.habits.instantiate(
                self.lifecycle.status(),
                now,
                self.lifecycle.next_change(),
                sim_start,
                tick_len,
            );
            trace!(target: "huum::lifecycle", agent = %self.name, added, "habits instantiated");
        }
        self.habits.prune(now);
        Ok(transition)
    }

    /// Draw wants for `classes`; remembers each computed probability.
    pub fn draw_wants(
        &mut self,
        classes: &[String],
        now: SimTime,
        tick_len: i64,
        rng: &mut SimRng,
        src: &dyn ValueSource,
    ) -> HuResult<usize> {
        let Agent { lifecycle, habits, wants, last_wants, .. } = self;
        last_wants.clear();
        last_wants.resize(classes.len(), 0.0);
        let status = lifecycle.status();
        wants.draw(classes, now, rng, |class| {
            let p = habits.want_probability(class, status, now, tick_len, src)?;
            if let Some(i) = classes.iter().position(|c| c == class) {
                last_wants[i] = p;
            }
            Ok(p)
        })
    }

    pub fn last_wants(&self) -> &[f64] {
        &self.last_wants
    }
}
