//! The `Sim` struct and its tick loop.

use tracing::{debug, info};

use huum_core::{CuId, SimClock, SimConfig, SimTime, Tick};

use crate::observer::Snapshot;
use crate::{OutputSettings, SimObserver, SimResult, World};

/// The main simulation runner.
///
/// `Sim` holds all simulation state and drives the tick loop:
///
/// 1. **Advance** the clock by one tick.
/// 2. **Drain** the event queue: swap it out and run every item once.
///    Effects queued while draining run next tick.
/// 3. **Scan** Probability and Switch events in tree order.
/// 4. **Ledgers**: apply storage rates.
/// 5. **Units**, each in load order: appliance patterns advance, then every
///    agent checks its lifecycle, prunes habits and draws wants, then every
///    agent gets at most one grant.
/// 6. **Record** a snapshot through the observer.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config: SimConfig,
    pub clock:  SimClock,
    pub world:  World,
    /// Output toggles the series were registered with.
    pub output: OutputSettings,
    pub title:  String,
    started:    bool,
}

impl Sim {
    pub(crate) fn new(config: SimConfig, world: World, output: OutputSettings, title: String) -> Self {
        Self { clock: config.make_clock(), config, world, output, title, started: false }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to the configured end time.
    ///
    /// Records the start state first if nothing was recorded yet, and calls
    /// [`SimObserver::on_sim_end`] when done.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        info!(target: "huum::sim", start = %self.clock.now(), end = %self.config.end, "run started");
        self.record_start(observer);
        while !self.clock.is_finished() {
            self.step(observer)?;
        }
        self.finish(observer);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores the end
    /// time).
    ///
    /// Useful for tests and incremental stepping.  Call
    /// [`finish`](Self::finish) afterwards to close the observer.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        self.record_start(observer);
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Signal the end of the run to `observer`.
    pub fn finish<O: SimObserver>(&mut self, observer: &mut O) {
        info!(
            target: "huum::sim",
            now = %self.clock.now(),
            ticks = self.clock.current_tick.0,
            executed = self.world.executed(),
            "run finished"
        );
        observer.on_sim_end(self.clock.now());
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn record_start<O: SimObserver>(&mut self, observer: &mut O) {
        if self.started {
            return;
        }
        self.started = true;
        self.record(observer);
    }

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.clock.advance();
        let tick = self.clock.current_tick;
        observer.on_tick_start(tick);
        let executed = self.process_tick(tick, self.clock.now())?;
        self.record(observer);
        observer.on_tick_end(tick, executed);
        Ok(())
    }

    fn process_tick(&mut self, tick: Tick, now: SimTime) -> SimResult<usize> {
        let executed = self.world.drain_queue(now)?;
        let fired = self.world.scan_events(now)?;
        self.world.update_ledgers(now);

        let mut grants = 0;
        for u in 0..self.world.units.len() {
            grants += self.world.step_unit(CuId(u as u32), now)?;
        }

        debug!(target: "huum::sim", %tick, %now, executed, fired, grants, "tick");
        Ok(executed)
    }

    fn record<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.now();
        self.world.refresh_series(now);
        observer.on_snapshot(&Snapshot {
            tick: self.clock.current_tick,
            now,
            last: self.clock.last(),
            series: self.world.series(),
        });
    }
}
