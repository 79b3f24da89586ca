//! `huum-tree` — the scenario's node arena and its address resolver.
//!
//! Every scenario element (model, holding, consumer unit, room, appliance,
//! agent, event, storage, elapsed-time tracker, lifecycle habit, usage
//! habit) is registered once as a [`Node`] in a [`Tree`].  Nodes live in a
//! flat `Vec` indexed by [`NodeId`](huum_core::NodeId); parent/child links
//! are ids, never pointers.
//!
//! | Module      | Contents                                             |
//! |-------------|------------------------------------------------------|
//! | [`kind`]    | `NodeKind`, `FunctionKind`, keyword tables           |
//! | [`node`]    | `Node`                                               |
//! | [`tree`]    | `Tree<P>` arena with a per-node payload              |
//! | [`resolve`] | `Target`, dotted-path resolution                     |
//!
//! # Paths
//!
//! A node's local id is `<keyword>_<name>` (`$room_kitchen`), its full path
//! is the dot-joined local ids from the root
//! (`$model_root.$holding_h1.$cu_flat.$room_kitchen`).  Resolution starts at
//! an origin node and walks upward until a segment matches, then downward
//! through typed child lookups.  See [`Tree::resolve`].

pub mod kind;
pub mod node;
pub mod resolve;
pub mod tree;

#[cfg(test)]
mod tests;

pub use kind::{FunctionKind, NodeKind};
pub use node::Node;
pub use resolve::Target;
pub use tree::Tree;
