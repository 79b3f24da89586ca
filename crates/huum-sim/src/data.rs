//! Scenario data records, decoded from TOML.
//!
//! The records mirror the node tree one to one.  Every level can own
//! `events`, `storages` and `passed_times`:
//!
//! ```toml
//! [model]
//! name = "town"
//!
//! [[model.holdings]]
//! name = "h1"
//!
//! [[model.holdings.consumer_units]]
//! name = "flat"
//!
//! [[model.holdings.consumer_units.agents]]
//! name = "bob"
//! ```
//!
//! Times are `YYYY-MM-DD HH:MM[:SS]` strings (UTC) or the tokens
//! `$model_start` / `$model_end`.

use std::path::Path;

use serde::Deserialize;

use crate::{SimError, SimResult};

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioData {
    pub settings: Settings,
    pub model:    ModelData,
}

impl ScenarioData {
    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| SimError::Read { path: path.display().to_string(), source })?;
        Self::from_toml_str(&text)
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub title:     String,
    pub start:     String,
    pub end:       String,
    /// Seconds per tick.
    pub time_step: i64,
    #[serde(default)]
    pub seed:      u64,
    #[serde(default)]
    pub output:    OutputSettings,
}

/// Which series are recorded and how they are written.  Read once at
/// initialization.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct OutputSettings {
    /// `none`, `all` or `changes`.
    pub filter:               String,
    /// One file per category instead of one per node.
    pub single_file:          bool,
    pub appliance_demand:     bool,
    pub appliance_activation: bool,
    pub agent_wants:          bool,
    pub agent_busy:           bool,
    pub storages:             bool,
    pub elapsed_times:        bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            filter:               "changes".into(),
            single_file:          false,
            appliance_demand:     true,
            appliance_activation: true,
            agent_wants:          false,
            agent_busy:           false,
            storages:             false,
            elapsed_times:        false,
        }
    }
}

// ── Shared blocks ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionData {
    Constant { value: f64 },
    Uniform { from: f64, to: f64 },
    Gaussian { mu: f64, sigma: f64 },
    /// Path to a `$get_value_function`.
    Function { path: String },
}

fn default_above() -> String {
    "last".into()
}

fn default_below() -> String {
    "first".into()
}

// ── Tree levels ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelData {
    pub name:     String,
    #[serde(default)]
    pub holdings: Vec<HoldingData>,
    #[serde(default)]
    pub events:       Vec<EventData>,
    #[serde(default)]
    pub storages:     Vec<StorageData>,
    #[serde(default)]
    pub passed_times: Vec<ElapsedData>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoldingData {
    pub name:           String,
    #[serde(default)]
    pub consumer_units: Vec<ConsumerUnitData>,
    #[serde(default)]
    pub events:       Vec<EventData>,
    #[serde(default)]
    pub storages:     Vec<StorageData>,
    #[serde(default)]
    pub passed_times: Vec<ElapsedData>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsumerUnitData {
    pub name:    String,
    #[serde(default)]
    pub rooms:   Vec<RoomData>,
    #[serde(default)]
    pub agents:  Vec<AgentData>,
    #[serde(default)]
    pub events:       Vec<EventData>,
    #[serde(default)]
    pub storages:     Vec<StorageData>,
    #[serde(default)]
    pub passed_times: Vec<ElapsedData>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomData {
    pub name:       String,
    #[serde(default)]
    pub appliances: Vec<ApplianceData>,
    #[serde(default)]
    pub events:       Vec<EventData>,
    #[serde(default)]
    pub storages:     Vec<StorageData>,
    #[serde(default)]
    pub passed_times: Vec<ElapsedData>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplianceData {
    pub name:           String,
    /// Class agents want; defaults to the name.
    #[serde(default)]
    pub class:          Option<String>,
    /// Seconds a grant keeps the appliance and its user blocked.
    #[serde(default)]
    pub block_length:   i64,
    #[serde(default = "yes")]
    pub block_user:     bool,
    #[serde(default)]
    pub usage_patterns: Vec<PatternData>,
    #[serde(default)]
    pub events:       Vec<EventData>,
    #[serde(default)]
    pub storages:     Vec<StorageData>,
    #[serde(default)]
    pub passed_times: Vec<ElapsedData>,
}

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PatternData {
    pub name:        String,
    pub demand_type: String,
    /// Seconds since activation.
    pub x:           Vec<f64>,
    pub y:           Vec<f64>,
}

// ── Agents ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentData {
    pub name:         String,
    pub lifecycle:    Vec<LifecycleData>,
    #[serde(default)]
    pub usage_habits: Vec<UsageHabitData>,
    #[serde(default)]
    pub templates:    Vec<TemplateData>,
    #[serde(default)]
    pub events:       Vec<EventData>,
    #[serde(default)]
    pub storages:     Vec<StorageData>,
    #[serde(default)]
    pub passed_times: Vec<ElapsedData>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleData {
    /// Unique per agent; one must be `initial`.
    pub key:          String,
    /// Defaults to the key.
    #[serde(default)]
    pub status:       Option<String>,
    #[serde(default)]
    pub min_duration: i64,
    /// Seconds after midnight.
    pub activation:   DistributionData,
    pub next:         String,
    #[serde(default)]
    pub alternatives: Vec<AlternativeData>,
    #[serde(default)]
    pub events:       Vec<EventData>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlternativeData {
    pub variable: String,
    pub operator: String,
    pub value:    String,
    pub target:   String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsageHabitData {
    pub name:      String,
    pub appliance: String,
    #[serde(default = "model_start")]
    pub start:     String,
    #[serde(default = "model_end")]
    pub end:       String,
    /// `add` or `mult`.
    pub kind:      String,
    #[serde(default)]
    pub guard:     Option<String>,
    pub payload:   HabitPayloadData,
}

fn model_start() -> String {
    "$model_start".into()
}

fn model_end() -> String {
    "$model_end".into()
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HabitPayloadData {
    Constant { value: f64 },
    /// Sampled at tick resolution from the habit's start.
    Table { x: Vec<f64>, y: Vec<f64> },
    Function { path: String },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TemplateData {
    pub name:      String,
    pub appliance: String,
    /// `cyclical_global`, `cyclical`, `start` or `end`.
    pub kind:      String,
    /// `add` or `mult`.
    pub combine:   String,
    #[serde(default)]
    pub guard:     Option<String>,
    pub length:    i64,
    #[serde(default)]
    pub buffer:    i64,
    pub x:         Vec<f64>,
    pub y:         Vec<f64>,
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventData {
    pub name:        String,
    /// `probability`, `switch` or `activate`.
    pub kind:        String,
    #[serde(default)]
    pub probability: Option<DistributionData>,
    #[serde(default)]
    pub switch:      bool,
    #[serde(default = "yes")]
    pub active:      bool,
    #[serde(default)]
    pub effects:     Vec<EffectData>,
}

/// One effect; at most one payload field may be set.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectData {
    pub target:       String,
    pub action:       String,
    #[serde(default)]
    pub name:         Option<String>,
    #[serde(default)]
    pub template:     Option<TemplateData>,
    #[serde(default)]
    pub pattern:      Option<PatternData>,
    #[serde(default)]
    pub distribution: Option<DistributionData>,
    #[serde(default)]
    pub number:       Option<f64>,
    #[serde(default)]
    pub time:         Option<String>,
}

// ── Ledgers ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageData {
    pub name:           String,
    #[serde(default)]
    pub initial_volume: f64,
    pub translators:    Vec<TranslatorData>,
    #[serde(default)]
    pub rates:          Vec<RateData>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslatorData {
    /// Status guard, or `default`.
    pub active_for: String,
    pub x:          Vec<f64>,
    pub y:          Vec<f64>,
    #[serde(default = "default_above")]
    pub above:      String,
    #[serde(default = "default_below")]
    pub below:      String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateData {
    pub name:  String,
    /// Added to the volume every tick.
    pub value: f64,
    #[serde(default = "model_start")]
    pub start: String,
    #[serde(default = "model_end")]
    pub end:   String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElapsedData {
    pub name:        String,
    #[serde(default = "model_start")]
    pub start:       String,
    pub translators: Vec<TranslatorData>,
}
