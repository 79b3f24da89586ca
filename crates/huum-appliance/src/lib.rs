//! `huum-appliance` — appliances and who gets to use them.
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`pattern`]   | `UsagePattern`: a per-tick demand curve played on use    |
//! | [`appliance`] | `Appliance`: occupancy, blocking, demand output          |
//! | [`arbiter`]   | `WantState`, `AppliancePool`, `grant_next`               |
//!
//! # Protocol
//!
//! ```text
//! per tick, per consumer unit:
//!   for agent in unit (list order):
//!     if busy: skip
//!     for class in pool (first-seen order), not already wanted:
//!       draw u; if u < p(class): push class to the agent's FIFO
//!   for agent in unit (list order):
//!     walk the FIFO; the first class with a free appliance is granted
//! ```
//!
//! A grant blocks the appliance for `max(pattern length, external block)`
//! and the agent for the external block only.  Wants that find no free
//! appliance stay queued without being redrawn.

pub mod appliance;
pub mod arbiter;
pub mod pattern;


pub use appliance::Appliance;
pub use arbiter::{AppliancePool, Grant, WantState, grant_next};
pub use pattern::UsagePattern;
