//! `huum-core` — foundational types for the `huum` household usage simulator.
//!
//! This crate is a dependency of every other `huum-*` crate.  It has no
//! `huum-*` dependencies and only a handful of external ones (`rand`,
//! `rand_distr`, `chrono`, `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `EventId`, `AgentId`, `ApplianceId`, …          |
//! | [`time`]    | `Tick`, `SimTime`, `SimClock`, `SimConfig`                |
//! | [`rng`]     | `SimRng` (the single seeded stream of a run)              |
//! | [`table`]   | `Table1d` piecewise-linear lookup, tick resampling        |
//! | [`error`]   | `HuError`, `HuResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and time types.      |

pub mod error;
pub mod ids;
pub mod rng;
pub mod table;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{HuError, HuResult};
pub use ids::{
    AgentId, ApplianceId, CuId, ElapsedId, EventId, HoldingId, NodeId, RoomId, StorageId,
};
pub use rng::SimRng;
pub use table::{Bound, Table1d};
pub use time::{SECS_PER_DAY, SimClock, SimConfig, SimTime, Tick};
