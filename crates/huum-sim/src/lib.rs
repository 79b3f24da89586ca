//! `huum-sim` — scenario loading, world state and the tick scheduler.
//!
//! # Tick loop
//!
//! ```text
//! build:  ScenarioData ─load─▶ tree + arenas ─connect─▶ resolved targets ─start─▶ agents in `initial`
//! run:    record(start)
//!         while now < end:
//!           ① advance clock
//!           ② drain event queue (one swap)
//!           ③ Probability / Switch scan, tree order
//!           ④ storage rates
//!           ⑤ per unit: patterns, agents (lifecycle, prune, wants), grants
//!           ⑥ record(now)
//! ```
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`data`]     | serde records decoded from TOML scenarios              |
//! | [`builder`]  | `SimBuilder`: load, connect, start                     |
//! | [`world`]    | `World`, `Slot`, `Scope`, effect dispatch              |
//! | [`agent`]    | `Agent`                                                |
//! | [`ledger`]   | `Storage`, `ElapsedTime`, translators                  |
//! | [`observer`] | `SimObserver`, `Snapshot`, `Series`                    |
//! | [`sim`]      | `Sim`                                                  |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use huum_sim::{NoopObserver, ScenarioData, SimBuilder};
//!
//! let data = ScenarioData::load("scenario.toml")?;
//! let mut sim = SimBuilder::new(data).build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod agent;
pub mod builder;
pub mod data;
pub mod error;
pub mod ledger;
pub mod observer;
pub mod sim;
pub mod world;

#[cfg(test)]
mod tests;

pub use agent::Agent;
pub use builder::SimBuilder;
pub use data::{OutputSettings, ScenarioData, Settings};
pub use error::{SimError, SimResult};
pub use ledger::{ElapsedTime, Rate, Storage, Translators};
pub use observer::{NoopObserver, Series, SeriesKind, SimObserver, Snapshot};
pub use sim::Sim;
pub use world::{ConsumerUnit, Room, Scope, Slot, World};
