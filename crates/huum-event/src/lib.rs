//! `huum-event` — events, their effects, and the deferred-effect queue.
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`action`] | `Action`: the closed action vocabulary                    |
//! | [`effect`] | `EventEffect`, `EffectPayload`                            |
//! | [`event`]  | `Event`, `EventKind`                                      |
//! | [`queue`]  | `EventQueue`, `QueueItem`                                 |
//!
//! # Lifecycle of an effect
//!
//! ```text
//! load     action string ──parse──▶ Action      (unknown → UnsupportedAction)
//! connect  target path ──resolve_one──▶ Target (cached)
//! fire     Event ──▶ one QueueItem per effect, optional deferred timestamp
//! tick     queue swapped out, every item executed once against `now`
//! ```
//!
//! Execution itself needs the whole world and lives in `huum-sim`.

pub mod action;
pub mod effect;
pub mod event;
pub mod queue;


pub use action::Action;
pub use effect::{EffectPayload, EventEffect};
pub use event::{Event, EventKind};
pub use queue::{EventQueue, QueueItem};
