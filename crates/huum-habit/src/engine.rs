//! Per-agent habit bookkeeping.

use tracing::trace;

use huum_core::{HuResult, SimTime};

use crate::{HabitKind, UsageHabit, UsageHabitTemplate, ValueSource};

/// An agent's active usage habits and the templates that regenerate them.
///
/// Habits are kept in insertion order; nothing here sorts.
#[derive(Clone, Debug, Default)]
pub struct HabitSet {
    habits:    Vec<UsageHabit>,
    templates: Vec<UsageHabitTemplate>,
}

impl HabitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, habit: UsageHabit) {
        self.habits.push(habit);
    }

    pub fn add_template(&mut self, template: UsageHabitTemplate) {
        self.templates.push(template);
    }

    pub fn habits(&self) -> &[UsageHabit] {
        &self.habits
    }

    pub fn habits_mut(&mut self) -> &mut [UsageHabit] {
        &mut self.habits
    }

    pub fn templates(&self) -> &[UsageHabitTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Drop every habit whose end has passed.  Returns how many went.
    pub fn prune(&mut self, now: SimTime) -> usize {
        let before = self.habits.len();
        self.habits.retain(|h| !h.is_expired(now));
        before - self.habits.len()
    }

    /// Delete habits by name.  A trailing `_` makes `pattern` a prefix.
    pub fn remove_matching(&mut self, pattern: &str) -> usize {
        let pattern = pattern.to_lowercase();
        let before = self.habits.len();
        if pattern.ends_with('_') {
            self.habits.retain(|h| !h.name.starts_with(&pattern));
        } else {
            self.habits.retain(|h| h.name != pattern);
        }
        before - self.habits.len()
    }

    /// Carve habits from every template admitting `status` for the status
    /// span `[now, next_change)`.  Returns the number of habits added.
    pub fn instantiate(
        &mut self,
        status: &str,
        now: SimTime,
        next_change: SimTime,
        sim_start: SimTime,
        tick_len: i64,
    ) -> usize {
        let mut added = 0;
        for template in self.templates.iter().filter(|t| t.matches_status(status)) {
            for (start, end) in template.windows(now, next_change, sim_start) {
                self.habits.push(template.instantiate(start, end, tick_len));
                added += 1;
            }
        }
        added
    }

    /// Probability that the agent wants `appliance` at `now`.
    pub fn want_probability(
        &self,
        appliance: &str,
        status: &str,
        now: SimTime,
        tick_len: i64,
        src: &dyn ValueSource,
    ) -> HuResult<f64> {
        // expired habits still match here so `value` can flag them
        let relevant = || {
            self.habits
                .iter()
                .filter(move |h| h.applies_to(appliance, status) && (h.has_started(now) || h.is_expired(now)))
        };

        let mut product = 1.0;
        for habit in relevant().filter(|h| h.kind() == HabitKind::Multiplicative) {
            product *= habit.value(now, tick_len, src)?;
        }
        if product == 0.0 {
            trace!(target: "huum::habits", appliance, "vetoed by a multiplicative habit");
            return Ok(0.0);
        }

        let mut sum = 0.0;
        for habit in relevant().filter(|h| h.kind() == HabitKind::Additive) {
            sum += habit.value(now, tick_len, src)?;
        }
        Ok(product * sum)
    }

    /// Resolve all function payloads.
    pub fn bind(&mut self, src: &dyn ValueSource) -> HuResult<()> {
        for habit in &mut self.habits {
            habit.bind(src)?;
        }
        Ok(())
    }
}
