//! Want queues and grants.

use std::collections::VecDeque;

use tracing::{debug, trace};

use huum_core::{AgentId, ApplianceId, HuResult, SimRng, SimTime};

use crate::Appliance;

// ── AppliancePool ─────────────────────────────────────────────────────────────

/// The appliances one consumer unit can use, grouped by class.
///
/// Classes keep first-registration order, appliances within a class keep
/// registration order; grants scan in exactly that order.
#[derive(Clone, Debug, Default)]
pub struct AppliancePool {
    classes: Vec<(String, Vec<ApplianceId>)>,
}

impl AppliancePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, class: &str, id: ApplianceId) {
        match self.classes.iter_mut().find(|(c, _)| c == class) {
            Some((_, ids)) => ids.push(id),
            None => self.classes.push((class.to_string(), vec![id])),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|(c, _)| c.as_str())
    }

    pub fn candidates(&self, class: &str) -> &[ApplianceId] {
        self.classes
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// ── WantState ─────────────────────────────────────────────────────────────────

/// An agent's side of the protocol: pending wants and the busy deadline.
#[derive(Clone, Debug, Default)]
pub struct WantState {
    queue:      VecDeque<String>,
    busy_until: Option<SimTime>,
}

impl WantState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Busy while `now < busy_until`; clears the deadline once it passes.
    pub fn is_busy(&mut self, now: SimTime) -> bool {
        if self.busy_until.is_some_and(|until| until <= now) {
            self.busy_until = None;
        }
        self.busy_until.is_some()
    }

    pub fn busy_until(&self) -> Option<SimTime> {
        self.busy_until
    }

    pub fn wants(&self, class: &str) -> bool {
        self.queue.iter().any(|c| c == class)
    }

    pub fn queue(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    /// Draw one uniform number per class not already queued and queue the
    /// class if the draw falls below `want(class)`.
    ///
    /// Busy agents draw nothing.  Returns how many classes were queued.
    pub fn draw<F>(
        &mut self,
        classes: impl IntoIterator<Item = impl AsRef<str>>,
        now: SimTime,
        rng: &mut SimRng,
        mut want: F,
    ) -> HuResult<usize>
    where
        F: FnMut(&str) -> HuResult<f64>,
    {
        if self.is_busy(now) {
            return Ok(0);
        }
        let mut queued = 0;
        for class in classes {
            let class = class.as_ref();
            if self.wants(class) {
                continue;
            }
            let u = rng.unit();
            let p = want(class)?;
            trace!(target: "huum::arbiter", class, p, u, "want draw");
            if u < p {
                self.queue.push_back(class.to_string());
                queued += 1;
            }
        }
        Ok(queued)
    }
}

// ── Grants ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Grant {
    pub appliance:     ApplianceId,
    pub class:         String,
    pub blocked_until: SimTime,
    pub busy_until:    Option<SimTime>,
}

/// Grant `agent` the first free appliance of the first satisfiable class in
/// its queue.  At most one grant per call.
pub fn grant_next(
    agent: AgentId,
    state: &mut WantState,
    pool: &AppliancePool,
    appliances: &mut [Appliance],
    now: SimTime,
) -> Option<Grant> {
    if state.is_busy(now) {
        return None;
    }
    let mut found = None;
    'scan: for (pos, class) in state.queue.iter().enumerate() {
        for &id in pool.candidates(class) {
            if appliances.get_mut(id.index()).is_some_and(|a| a.is_free(now)) {
                found = Some((pos, id));
                break 'scan;
            }
        }
    }
    let (pos, id) = found?;
    let class = state.queue.remove(pos)?;
    let appliance = appliances.get_mut(id.index())?;
    let (blocked_until, busy_until) = appliance.occupy(agent, now);
    debug!(
        target: "huum::arbiter",
        %agent,
        appliance = %appliance.name,
        %blocked_until,
        "granted"
    );
    state.busy_until = busy_until;
    Some(Grant { appliance: id, class, blocked_until, busy_until })
}
