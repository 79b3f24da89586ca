//! Simulation time model.
//!
//! # Design
//!
//! Two representations live side by side:
//!
//! - `Tick`: a monotonically increasing step counter, the canonical unit of
//!   the scheduler loop.
//! - `SimTime`: absolute simulated time in whole seconds since the Unix
//!   epoch.  Habit windows, blocking deadlines and lifecycle transitions are
//!   all absolute `SimTime`s.
//!
//! The mapping is held in `SimClock`:
//!
//!   now = start + tick * tick_secs
//!
//! There are no time zones; "local midnight" is UTC midnight of the simulated
//! day.  `chrono` is used only at the edges (parsing scenario timestamps,
//! formatting output rows, naming weekdays).

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};

use crate::{HuError, HuResult};

pub const SECS_PER_DAY: i64 = 86_400;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimTime ──────────────────────────────────────────────────────────────────

/// Absolute simulated time, seconds since the Unix epoch (UTC).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub i64);

impl SimTime {
    /// Midnight of the simulated day containing `self`.
    #[inline]
    pub fn day_start(self) -> SimTime {
        SimTime(self.0 - self.0.rem_euclid(SECS_PER_DAY))
    }

    /// Day of the week.  1970-01-01 was a Thursday.
    pub fn weekday(self) -> Weekday {
        let days = self.0.div_euclid(SECS_PER_DAY);
        WEEKDAYS[(days + 3).rem_euclid(7) as usize]
    }

    /// Parse a scenario timestamp.
    ///
    /// Accepted forms: `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM`, the same
    /// with a `T` separator, and a bare `YYYY-MM-DD` (midnight).
    pub fn parse(s: &str) -> HuResult<SimTime> {
        let s = s.trim();
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(SimTime(dt.and_utc().timestamp()));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| SimTime(dt.and_utc().timestamp()))
            .ok_or_else(|| HuError::Parse(format!("invalid timestamp `{s}`")))
    }
}

impl std::ops::Add<i64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: i64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub<i64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn sub(self, rhs: i64) -> SimTime {
        SimTime(self.0 - rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: SimTime) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(self.0, 0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "@{}", self.0),
        }
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and absolute simulated time.
///
/// `SimClock` is cheap to copy and holds no heap data.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated time of tick 0.
    pub start: SimTime,
    /// Simulated time at which the run ends.
    pub end: SimTime,
    /// How many simulated seconds one tick represents.
    pub tick_secs: u32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start: SimTime, end: SimTime, tick_secs: u32) -> Self {
        Self { start, end, tick_secs, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Tick length in seconds as a signed offset.
    #[inline]
    pub fn tick_len(&self) -> i64 {
        self.tick_secs as i64
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_len()
    }

    /// Current simulated time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.start + self.elapsed_secs()
    }

    /// Simulated time of the previous tick (equals `start` at tick 0).
    #[inline]
    pub fn last(&self) -> SimTime {
        if self.current_tick == Tick::ZERO {
            self.start
        } else {
            self.now() - self.tick_len()
        }
    }

    /// `true` once the clock has reached the configured end.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.now() >= self.end
    }

    /// Number of ticks between start and end.
    pub fn total_ticks(&self) -> u64 {
        let span = (self.end - self.start).max(0) as u64;
        span.div_ceil(self.tick_secs as u64)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-level time and seed configuration.
///
/// Built by the scenario loader from the `[settings]` table and handed to
/// every `from_data` constructor as the time context.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Simulated time of tick 0.
    pub start: SimTime,

    /// Simulated time at which the run stops (exclusive).
    pub end: SimTime,

    /// Seconds per tick (the compute interval).
    pub tick_secs: u32,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl SimConfig {
    /// Reject configurations the scheduler cannot run.
    pub fn validate(&self) -> HuResult<()> {
        if self.tick_secs == 0 {
            return Err(HuError::Config("time step must be positive".into()));
        }
        if self.end <= self.start {
            return Err(HuError::Config(format!(
                "end {} is not after start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn tick_len(&self) -> i64 {
        self.tick_secs as i64
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start, self.end, self.tick_secs)
    }
}
