//! Simulation observer trait and the recorded series it sees.

use huum_core::{AgentId, ApplianceId, ElapsedId, SimTime, StorageId, Tick};

// ── Series ────────────────────────────────────────────────────────────────────

/// What a series records.  One category per output toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    ApplianceDemand,
    ApplianceActivation,
    AgentWants,
    AgentBusy,
    Storage,
    ElapsedTime,
}

impl SeriesKind {
    /// Stable name used for file names.
    pub fn category(self) -> &'static str {
        match self {
            SeriesKind::ApplianceDemand => "appliance_demand",
            SeriesKind::ApplianceActivation => "appliance_activation",
            SeriesKind::AgentWants => "agent_wants",
            SeriesKind::AgentBusy => "agent_busy",
            SeriesKind::Storage => "storage",
            SeriesKind::ElapsedTime => "elapsed_time",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SeriesSource {
    Demand(ApplianceId),
    Activation(ApplianceId),
    Wants(AgentId),
    Busy(AgentId),
    Storage(StorageId),
    Elapsed(ElapsedId),
}

/// One recorded row source: a node's values under a header fixed when the
/// scenario is built.
#[derive(Clone, Debug)]
pub struct Series {
    pub kind:   SeriesKind,
    /// Full path of the node recorded.
    pub path:   String,
    /// Node name, used for column prefixes in single-file output.
    pub label:  String,
    pub header: Vec<String>,
    /// Values at the latest snapshot, in `header` order.
    pub values: Vec<f64>,
    pub(crate) source: SeriesSource,
}

/// Read-only view handed to observers once per tick (and once at start).
#[derive(Copy, Clone, Debug)]
pub struct Snapshot<'a> {
    pub tick:   Tick,
    pub now:    SimTime,
    pub last:   SimTime,
    pub series: &'a [Series],
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
pub trait SimObserver {
    /// Called at the start of each tick, after the clock advanced.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick.
    ///
    /// `executed` is the number of queued effects that ran this tick.
    fn on_tick_end(&mut self, _tick: Tick, _executed: usize) {}

    /// Called once at the start of the run and after every tick.
    ///
    /// Output writers record from here so the sim never needs to know about
    /// any specific output format.
    fn on_snapshot(&mut self, _snapshot: &Snapshot<'_>) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _now: SimTime) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
