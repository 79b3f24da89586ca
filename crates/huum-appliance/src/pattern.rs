//! Usage patterns: demand curves replayed tick by tick after a grant.

use huum_core::{HuError, HuResult, SimTime, Table1d};

#[derive(Clone, Debug, PartialEq)]
pub struct UsagePattern {
    pub name:        String,
    /// Output column this pattern's demand is summed into.
    pub demand_type: String,
    values:          Vec<f64>,
    tick_len:        i64,
    start:           Option<SimTime>,
    end:             Option<SimTime>,
    /// Index of the value reported this tick; `-1` while inactive.
    pos:             i64,
}

impl UsagePattern {
    /// Resample `curve` at tick resolution from 0 to its last `x`, inclusive.
    pub fn new(
        name: impl Into<String>,
        demand_type: impl Into<String>,
        curve: &Table1d,
        tick_len: i64,
    ) -> HuResult<Self> {
        let name = name.into().to_lowercase();
        if tick_len <= 0 {
            return Err(HuError::Config("tick length must be positive".into()));
        }
        let x_last = curve.x_max();
        if x_last < 0.0 {
            return Err(HuError::defect(format!("usage pattern `{name}` ends before 0")));
        }
        let count = 1 + (x_last as i64 / tick_len) as usize;
        Ok(Self {
            name,
            demand_type: demand_type.into().to_lowercase(),
            values: curve.resample(tick_len as f64, count),
            tick_len,
            start: None,
            end: None,
            pos: -1,
        })
    }

    /// Seconds the pattern plays for.
    pub fn length_secs(&self) -> i64 {
        self.values.len() as i64 * self.tick_len
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    /// Start playing at `now`; the first value is reported this tick.
    pub fn activate(&mut self, now: SimTime) {
        self.start = Some(now);
        self.end = Some(now + self.length_secs());
        self.pos = 0;
    }

    pub fn deactivate(&mut self) {
        self.start = None;
        self.end = None;
        self.pos = -1;
    }

    /// Advance one tick.  Playback covers `[start, end)`, the same
    /// half-open window the appliance is blocked for.
    pub fn update(&mut self, now: SimTime) {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return;
        };
        if now >= end {
            self.deactivate();
        } else if now > start {
            self.pos += 1;
        }
    }

    /// Demand this tick.
    pub fn value(&self) -> f64 {
        usize::try_from(self.pos)
            .ok()
            .and_then(|i| self.values.get(i))
            .copied()
            .unwrap_or(0.0)
    }
}
