use super::Command;
use crate::error::{EditError, Result};
use crate::node::{NodeId, NodePatch};
use crate::scene::NodeStore;

#[derive(Clone, Debug, PartialEq)]
pub struct AttrChange {
    pub id: NodeId,
    pub before: NodePatch,
    pub after: NodePatch,
}

/// Before/after attribute snapshots for one or more nodes.
#[derive(Clone, Debug)]
pub struct SetAttrs {
    desc: String,
    changes: Vec<AttrChange>,
}

impl SetAttrs {
    /// Wrap snapshots taken by the caller, typically `before` at gesture
    /// start and `after` once the live preview settled.
    pub fn new(desc: impl Into<String>, changes: Vec<AttrChange>) -> Self {
        SetAttrs { desc: desc.into(), changes }
    }

    /// Capture `before` from the current node state for each `(id, after)`.
    pub fn capture(desc: impl Into<String>, store: &dyn NodeStore, patches: Vec<(NodeId, NodePatch)>) -> Result<Self> {
        let mut changes = Vec::with_capacity(patches.len());
        for (id, after) in patches {
            let node = store.node(id).ok_or(EditError::NodeNotFound(id))?;
            changes.push(AttrChange { id, before: node.snapshot_for(&after), after });
        }
        Ok(SetAttrs::new(desc, changes))
    }

    fn check(&self, store: &dyn NodeStore) -> Result<()> {
        match self.changes.iter().find(|c| store.node(c.id).is_none()) {
            Some(c) => Err(EditError::NodeNotFound(c.id)),
            None => Ok(()),
        }
    }
}

impl Command for SetAttrs {
    fn desc(&self) -> &str { &self.desc }

    fn apply(&mut self, store: &mut dyn NodeStore) -> Result<()> {
        self.check(store)?;
        for c in &self.changes {
            if let Some(node) = store.node_mut(c.id) {
                node.update_attrs(&c.after);
            }
        }
        Ok(())
    }

    fn undo(&mut self, store: &mut dyn NodeStore) -> Result<()> {
        self.check(store)?;
        for c in self.changes.iter().rev() {
            if let Some(node) = store.node_mut(c.id) {
                node.update_attrs(&c.before);
            }
        }
        Ok(())
    }
}
