//! The node arena.

use rustc_hash::FxHashMap;

use huum_core::{HuError, HuResult, NodeId};

use crate::{Node, NodeKind};

/// Arena of [`Node`]s, each carrying a payload `P` that maps the node back to
/// whatever owns its runtime state.
///
/// Registration is append-only: ids are dense, in registration order, and
/// nothing is ever removed.
#[derive(Clone, Debug)]
pub struct Tree<P> {
    nodes:   Vec<Node<P>>,
    by_path: FxHashMap<String, NodeId>,
}

impl<P> Default for Tree<P> {
    fn default() -> Self {
        Self { nodes: Vec::new(), by_path: FxHashMap::default() }
    }
}

impl<P> Tree<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the root.  A tree has exactly one.
    pub fn add_root(&mut self, kind: NodeKind, name: &str, payload: P) -> HuResult<NodeId> {
        if !self.nodes.is_empty() {
            return Err(HuError::defect("tree already has a root"));
        }
        let name = normalize(name)?;
        let local_id = format!("{}_{}", kind.keyword(), name);
        self.push(Node {
            id: NodeId(0),
            name,
            kind,
            full_path: local_id.clone(),
            local_id,
            depth: 0,
            parent: None,
            children: Vec::new(),
            payload,
        })
    }

    /// Register `name` of `kind` under `parent`.
    ///
    /// Fails if the parent kind cannot contain `kind` or if the parent
    /// already has a child with the same local id.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: &str,
        payload: P,
    ) -> HuResult<NodeId> {
        let name = normalize(name)?;
        let local_id = format!("{}_{}", kind.keyword(), name);
        let p = self.node(parent)?;
        if !p.kind.can_contain(kind) {
            return Err(HuError::defect(format!(
                "a {} cannot contain a {} (`{}` under `{}`)",
                p.kind, kind, local_id, p.full_path
            )));
        }
        let full_path = format!("{}.{}", p.full_path, local_id);
        let depth = p.depth + 1;
        let id = self.push(Node {
            id: NodeId::INVALID,
            name,
            kind,
            local_id,
            full_path,
            depth,
            parent: Some(parent),
            children: Vec::new(),
            payload,
        })?;
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    fn push(&mut self, mut node: Node<P>) -> HuResult<NodeId> {
        if self.by_path.contains_key(&node.full_path) {
            return Err(HuError::defect(format!("duplicate node `{}`", node.full_path)));
        }
        let id = NodeId::try_from(self.nodes.len())
            .map_err(|_| HuError::defect("too many nodes"))?;
        node.id = id;
        self.by_path.insert(node.full_path.clone(), id);
        self.nodes.push(node);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> HuResult<&Node<P>> {
        self.nodes.get(id.index()).ok_or(HuError::NodeNotFound(id))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<P>> {
        self.nodes.get(id.index())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.nodes.first().map(|n| n.id)
    }

    /// Look up a node by its exact full path.
    pub fn find(&self, full_path: &str) -> Option<NodeId> {
        self.by_path.get(full_path).copied()
    }

    /// Direct child of `parent` with the given local id.
    pub fn child(&self, parent: NodeId, local_id: &str) -> Option<NodeId> {
        let p = self.get(parent)?;
        p.children.iter().copied().find(|&c| self.nodes[c.index()].local_id == local_id)
    }

    /// Direct children of `parent` of one kind, in registration order.
    pub fn children_of_kind(&self, parent: NodeId, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.get(parent)
            .map(|p| p.children.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |c| self.nodes[c.index()].kind == kind)
    }

    /// Full path of `id`, or a placeholder for unknown ids.  For messages.
    pub fn path_of(&self, id: NodeId) -> &str {
        self.get(id).map(|n| n.full_path.as_str()).unwrap_or("<unknown>")
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<P>> {
        self.nodes.iter()
    }
}

fn normalize(name: &str) -> HuResult<String> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(HuError::defect("node names must not be empty"));
    }
    if name.contains('.') {
        return Err(HuError::defect(format!("node name `{name}` must not contain `.`")));
    }
    Ok(name)
}
