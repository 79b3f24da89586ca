//! Usage-habit templates.
//!
//! A template is instantiated whenever its agent enters a status the
//! template's guard admits.  The kind decides where windows are carved out of
//! the status span `[now, next_change)`:
//!
//! | Kind              | Windows                                                   |
//! |-------------------|-----------------------------------------------------------|
//! | `CyclicalGlobal`  | every `length`, phase-locked to the simulation start      |
//! | `Cyclical`        | every `length`, starting at `now`                         |
//! | `Start`           | one, `[now + buffer, now + buffer + length)`              |
//! | `End`             | one, `[next - buffer - length, next - buffer)`            |
//!
//! All windows except `End` are clipped at `next_change`.  `End` may start
//! before the status began.

use huum_core::{HuError, HuResult, SimTime, Table1d};

use crate::{HabitKind, HabitPayload, UsageHabit};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TemplateKind {
    CyclicalGlobal,
    Cyclical,
    Start,
    End,
}

impl TemplateKind {
    pub fn parse(s: &str) -> HuResult<TemplateKind> {
        match s.to_ascii_lowercase().as_str() {
            "cyclical_global" => Ok(TemplateKind::CyclicalGlobal),
            "cyclical" => Ok(TemplateKind::Cyclical),
            "start" => Ok(TemplateKind::Start),
            "end" => Ok(TemplateKind::End),
            other => Err(HuError::defect(format!("unsupported template kind `{other}`"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UsageHabitTemplate {
    pub name:      String,
    pub appliance: String,
    pub guard:     Option<String>,
    pub kind:      TemplateKind,
    /// Window length in seconds.
    pub length:    i64,
    /// Offset from the status start (`Start`) or end (`End`) in seconds.
    pub buffer:    i64,
    pub combine:   HabitKind,
    /// Value over seconds since the window start.
    pub curve:     Table1d,
}

impl UsageHabitTemplate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        appliance: impl Into<String>,
        guard: Option<String>,
        kind: TemplateKind,
        length: i64,
        buffer: i64,
        combine: HabitKind,
        curve: Table1d,
    ) -> HuResult<Self> {
        let name = name.into().to_lowercase();
        if length <= 0 {
            return Err(HuError::defect(format!(
                "template `{name}` needs a positive length, got {length}"
            )));
        }
        Ok(Self {
            name,
            appliance: appliance.into().to_lowercase(),
            guard: guard.map(|g| g.to_lowercase()),
            kind,
            length,
            buffer,
            combine,
            curve,
        })
    }

    pub fn matches_status(&self, status: &str) -> bool {
        self.guard.as_deref().is_none_or(|g| status.starts_with(g))
    }

    /// Windows for a status that began at `now` and ends at `next_change`.
    pub fn windows(&self, now: SimTime, next_change: SimTime, sim_start: SimTime) -> Vec<(SimTime, SimTime)> {
        let mut out = Vec::new();
        match self.kind {
            TemplateKind::CyclicalGlobal | TemplateKind::Cyclical => {
                let mut start = match self.kind {
                    TemplateKind::CyclicalGlobal => now - (now - sim_start).rem_euclid(self.length),
                    _ => now,
                };
                while start < next_change {
                    let end = (start + self.length).min(next_change);
                    out.push((start, end));
                    start = start + self.length;
                }
            }
            TemplateKind::Start => {
                let start = now + self.buffer;
                out.push((start, (start + self.length).min(next_change)));
            }
            TemplateKind::End => {
                let end = next_change - self.buffer;
                out.push((end - self.length, end));
            }
        }
        out.retain(|(s, e)| e > s);
        out
    }

    /// A concrete habit over `[start, end)`, its curve resampled per tick.
    pub fn instantiate(&self, start: SimTime, end: SimTime, tick_len: i64) -> UsageHabit {
        let tick_len = tick_len.max(1);
        let count = ((end - start).max(0) as u64).div_ceil(tick_len as u64) as usize;
        let values = self.curve.resample(tick_len as f64, count);
        UsageHabit::new(
            self.name.clone(),
            self.appliance.clone(),
            start,
            end,
            self.combine,
            self.guard.clone(),
            HabitPayload::Table(values),
        )
    }
}
