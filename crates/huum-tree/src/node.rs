use huum_core::NodeId;

use crate::NodeKind;

/// One registered scenario element.
///
/// Immutable after registration apart from `children`, which grows while
/// the scenario is being built.
#[derive(Clone, Debug)]
pub struct Node<P> {
    pub id:        NodeId,
    /// Lowercased name.
    pub name:      String,
    pub kind:      NodeKind,
    /// `<keyword>_<name>`.
    pub local_id:  String,
    /// Dot-joined local ids from the root; the root's equals its local id.
    pub full_path: String,
    /// 0 for the root.
    pub depth:     u32,
    pub parent:    Option<NodeId>,
    pub children:  Vec<NodeId>,
    /// What this node stands for in the owning arena.
    pub payload:   P,
}

impl<P> Node<P> {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
