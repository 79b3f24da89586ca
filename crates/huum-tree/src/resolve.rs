//! Dotted-path resolution.
//!
//! # Matching order
//!
//! At each node, the first segment of the (lowercased) path is tried
//! against, in order:
//!
//! 1. nothing left → the node itself
//! 2. the node's exact full path
//! 3. the node's type keyword (`$agent`) → local lookup of the remainder
//! 4. the node's local id (`$agent_bob`) → local lookup of the remainder
//! 5. `$self` → local lookup of the remainder
//! 6. a function keyword or a child-type prefix this node can contain
//!    → local lookup of the whole path
//!
//! If nothing matches, the search restarts at the parent with the same
//! path.  Running out of parents is a resolution error.  Once a local lookup
//! has started, a missing child is an error; resolution never climbs back
//! out of a downward walk.

use huum_core::{HuError, HuResult, NodeId};

use crate::{FunctionKind, NodeKind, Tree};

const SELF_KEYWORD: &str = "$self";

/// Something a path resolved to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Target {
    /// A node, to be dispatched through its event handler.
    Node(NodeId),
    /// A function exposed by `owner`.
    Function { owner: NodeId, function: FunctionKind },
}

impl Target {
    pub fn node(self) -> NodeId {
        match self {
            Target::Node(id) => id,
            Target::Function { owner, .. } => owner,
        }
    }
}

enum Step {
    Found(Vec<Target>),
    Climb,
}

impl<P> Tree<P> {
    /// Resolve `path` relative to `origin`.
    ///
    /// Pure lookup.  Callers resolve once at connect time and keep the
    /// result.
    pub fn resolve(&self, origin: NodeId, path: &str) -> HuResult<Vec<Target>> {
        let lowered = path.trim().to_lowercase();
        if let Some(id) = self.find(&lowered) {
            return Ok(vec![Target::Node(id)]);
        }
        let parts: Vec<&str> = if lowered.is_empty() {
            Vec::new()
        } else {
            lowered.split('.').collect()
        };

        let mut at = origin;
        loop {
            match self.resolve_at(at, &parts, &lowered) {
                Ok(Step::Found(targets)) => return Ok(targets),
                Ok(Step::Climb) => match self.node(at)?.parent {
                    Some(parent) => at = parent,
                    None => return Err(self.fail(origin, path, "no match up to the root")),
                },
                Err(reason) => return Err(self.fail(origin, path, &reason)),
            }
        }
    }

    /// Resolve `path` and insist on exactly one target.
    pub fn resolve_one(&self, origin: NodeId, path: &str) -> HuResult<Target> {
        let mut targets = self.resolve(origin, path)?;
        if targets.len() != 1 {
            return Err(self.fail(
                origin,
                path,
                &format!("expected exactly one target, found {}", targets.len()),
            ));
        }
        Ok(targets.remove(0))
    }

    /// Resolve `path` to exactly one function target.
    pub fn resolve_function(&self, origin: NodeId, path: &str) -> HuResult<Target> {
        match self.resolve_one(origin, path)? {
            t @ Target::Function { .. } => Ok(t),
            Target::Node(id) => Err(self.fail(
                origin,
                path,
                &format!("`{}` is a node, not a function", self.path_of(id)),
            )),
        }
    }

    fn resolve_at(&self, at: NodeId, parts: &[&str], joined: &str) -> Result<Step, String> {
        let node = self.node(at).map_err(|e| e.to_string())?;
        let Some(&first) = parts.first() else {
            return Ok(Step::Found(vec![Target::Node(at)]));
        };

        if joined == node.full_path {
            return Ok(Step::Found(vec![Target::Node(at)]));
        }
        if first == node.kind.keyword() || first == node.local_id || first == SELF_KEYWORD {
            return self.lookup_local(at, &parts[1..]).map(Step::Found);
        }
        if node.kind.functions().iter().any(|f| f.keyword() == first) {
            return self.lookup_local(at, parts).map(Step::Found);
        }
        if let Some(kind) = NodeKind::from_keyword(type_prefix(first)) {
            if node.kind.can_contain(kind) {
                return self.lookup_local(at, parts).map(Step::Found);
            }
        }
        Ok(Step::Climb)
    }

    fn lookup_local(&self, at: NodeId, parts: &[&str]) -> Result<Vec<Target>, String> {
        let node = self.node(at).map_err(|e| e.to_string())?;
        let Some(&first) = parts.first() else {
            return Ok(vec![Target::Node(at)]);
        };

        if let Some(&function) = node.kind.functions().iter().find(|f| f.keyword() == first) {
            if parts.len() > 1 {
                return Err(format!("`{first}` must be the last path segment"));
            }
            return Ok(vec![Target::Function { owner: at, function }]);
        }

        let kind = NodeKind::from_keyword(type_prefix(first))
            .filter(|&k| node.kind.can_contain(k))
            .ok_or_else(|| format!("`{first}` is not a child type of {}", node.kind))?;
        let child = self
            .child(at, first)
            .filter(|&c| self.get(c).is_some_and(|n| n.kind == kind))
            .ok_or_else(|| format!("`{}` has no child `{first}`", node.full_path))?;
        self.lookup_local(child, &parts[1..])
    }

    fn fail(&self, origin: NodeId, path: &str, reason: &str) -> HuError {
        HuError::Resolution {
            path:   path.to_string(),
            origin: self.path_of(origin).to_string(),
            reason: reason.to_string(),
        }
    }
}

/// `$room_kitchen` → `$room`.
fn type_prefix(segment: &str) -> &str {
    segment.split('_').next().unwrap_or(segment)
}
