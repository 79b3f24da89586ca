//! Volume and elapsed-time ledgers.
//!
//! Both expose a single value function: a translator table, picked by the
//! caller's status guard or `"default"`, applied to the ledger's quantity.

use huum_core::{HuError, HuResult, NodeId, SimTime, Table1d};

pub const DEFAULT_TRANSLATOR: &str = "default";

// ── Translators ───────────────────────────────────────────────────────────────

/// Translator tables keyed by status guard.  `default` is mandatory.
#[derive(Clone, Debug, Default)]
pub struct Translators {
    tables: Vec<(String, Table1d)>,
}

impl Translators {
    pub fn add(&mut self, key: &str, table: Table1d) -> HuResult<()> {
        let key = key.trim().to_lowercase();
        if self.tables.iter().any(|(k, _)| *k == key) {
            return Err(HuError::defect(format!("duplicate translator `{key}`")));
        }
        self.tables.push((key, table));
        Ok(())
    }

    pub fn check(&self, owner: &str) -> HuResult<()> {
        if self.get(DEFAULT_TRANSLATOR).is_none() {
            return Err(HuError::defect(format!("`{owner}` has no `default` translator")));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<&Table1d> {
        self.tables.iter().find(|(k, _)| k == key).map(|(_, t)| t)
    }

    /// Translate `x` with the table for `guard`, falling back to `default`.
    pub fn translate(&self, guard: &str, x: f64) -> HuResult<f64> {
        self.get(guard)
            .or_else(|| self.get(DEFAULT_TRANSLATOR))
            .map(|t| t.value(x))
            .ok_or_else(|| HuError::InvariantViolation("translator lookup without a default".into()))
    }
}

// ── Storage ───────────────────────────────────────────────────────────────────

/// A constant per-tick increase, valid for `start <= now < end`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rate {
    pub name:     String,
    pub per_tick: f64,
    pub start:    SimTime,
    pub end:      SimTime,
}

#[derive(Clone, Debug)]
pub struct Storage {
    pub node:        NodeId,
    pub name:        String,
    volume:          f64,
    rates:           Vec<Rate>,
    pub translators: Translators,
}

impl Storage {
    pub fn new(node: NodeId, name: impl Into<String>, volume: f64) -> Self {
        Self {
            node,
            name: name.into().to_lowercase(),
            volume,
            rates: Vec::new(),
            translators: Translators::default(),
        }
    }

    pub fn add_rate(&mut self, rate: Rate) {
        self.rates.push(rate);
    }

    pub fn rates(&self) -> &[Rate] {
        &self.rates
    }

    /// Drop finished rates, then add every running one to the volume.
    pub fn update(&mut self, now: SimTime) {
        self.rates.retain(|r| r.end > now);
        self.volume += self.rates.iter().filter(|r| r.start <= now).map(|r| r.per_tick).sum::<f64>();
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn empty(&mut self) {
        self.volume = 0.0;
    }

    pub fn add_volume(&mut self, amount: f64) {
        self.volume += amount;
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    pub fn value(&self, guard: &str) -> HuResult<f64> {
        self.translators.translate(guard, self.volume)
    }
}

// ── ElapsedTime ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ElapsedTime {
    pub node:        NodeId,
    pub name:        String,
    reference:       SimTime,
    pub translators: Translators,
}

impl ElapsedTime {
    pub fn new(node: NodeId, name: impl Into<String>, reference: SimTime) -> Self {
        Self {
            node,
            name: name.into().to_lowercase(),
            reference,
            translators: Translators::default(),
        }
    }

    pub fn reference(&self) -> SimTime {
        self.reference
    }

    pub fn elapsed_secs(&self, now: SimTime) -> i64 {
        now - self.reference
    }

    pub fn reset(&mut self, at: SimTime) {
        self.reference = at;
    }

    pub fn value(&self, now: SimTime, guard: &str) -> HuResult<f64> {
        self.translators.translate(guard, self.elapsed_secs(now) as f64)
    }
}
