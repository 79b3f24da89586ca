//! Simulator error taxonomy.
//!
//! Nothing in the runtime is recoverable: every variant halts the run.  The
//! variants only differ in what they blame.
//!
//! | Variant              | Blames                                            |
//! |----------------------|---------------------------------------------------|
//! | `ScenarioDefect`     | the scenario data (duplicates, unknown kinds, …)  |
//! | `Resolution`         | an address path that does not resolve cleanly     |
//! | `UnsupportedAction`  | an action no target implements                    |
//! | `InvariantViolation` | the simulator itself (e.g. querying a stale habit)|
//!
//! Sub-crates wrap `HuError` in their own enums via `#[from]`.

use thiserror::Error;

use crate::NodeId;

/// The top-level error type for `huum-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum HuError {
    #[error("scenario defect: {0}")]
    ScenarioDefect(String),

    #[error("cannot resolve `{path}` from `{origin}`: {reason}")]
    Resolution {
        path:   String,
        origin: String,
        reason: String,
    },

    #[error("unsupported action `{action}` for {target}")]
    UnsupportedAction { action: String, target: String },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HuError {
    pub fn defect(msg: impl Into<String>) -> Self {
        HuError::ScenarioDefect(msg.into())
    }

    pub fn unsupported(action: impl Into<String>, target: impl Into<String>) -> Self {
        HuError::UnsupportedAction { action: action.into(), target: target.into() }
    }
}

/// Shorthand result type for all `huum-*` crates.
pub type HuResult<T> = Result<T, HuError>;
