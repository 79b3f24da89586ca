//! `huum-habit` — what makes an agent want to use an appliance.
//!
//! | Module           | Contents                                                    |
//! |------------------|-------------------------------------------------------------|
//! | [`distribution`] | `Distribution`, `FunctionSlot`, the `ValueSource` seam       |
//! | [`usage`]        | `UsageHabit`: one windowed additive/multiplicative term     |
//! | [`template`]     | `UsageHabitTemplate`: stencils carving habits from a status |
//! | [`engine`]       | `HabitSet`: pruning, instantiation, want-probability         |
//! | [`lifecycle`]    | `LifecycleHabit`, `Lifecycle` status machine                 |
//!
//! # Want-probability
//!
//! ```text
//! p(appliance) = Σ additive · Π multiplicative
//! ```
//!
//! over the habits that target the appliance, have started, and whose status
//! guard (if any) is a prefix of the agent's status.  A multiplicative zero
//! short-circuits to 0 without evaluating the additive terms.
//!
//! Indirect function payloads never reach into the world directly; they go
//! through the [`ValueSource`] trait, which the simulation crate implements
//! over its ledgers.

pub mod distribution;
pub mod engine;
pub mod lifecycle;
pub mod template;
pub mod usage;


pub use distribution::{Distribution, FunctionSlot, ValueSource};
pub use engine::HabitSet;
pub use lifecycle::{Alternative, Condition, Lifecycle, LifecycleHabit, NextStatus, Transition};
pub use template::{TemplateKind, UsageHabitTemplate};
pub use usage::{HabitKind, HabitPayload, UsageHabit};
