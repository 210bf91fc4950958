use super::Command;
use crate::error::{EditError, Result};
use crate::node::{GraphNode, NodeId};
use crate::scene::NodeStore;

/// Insert nodes at the top of the stacking order. Nodes are held here while
/// undone, together with the index they occupied.
#[derive(Debug)]
pub struct AddNodes {
    desc: String,
    ids: Vec<NodeId>,
    held: Vec<(Option<usize>, GraphNode)>,
}

impl AddNodes {
    pub fn new(desc: impl Into<String>, nodes: Vec<GraphNode>) -> Self {
        AddNodes {
            desc: desc.into(),
            ids: nodes.iter().map(|n| n.id()).collect(),
            held: nodes.into_iter().map(|n| (None, n)).collect(),
        }
    }

    /// For nodes the tool already inserted during live preview.
    pub fn recorded(desc: impl Into<String>, ids: Vec<NodeId>) -> Self {
        AddNodes { desc: desc.into(), ids, held: Vec::new() }
    }
}

impl Command for AddNodes {
    fn desc(&self) -> &str { &self.desc }

    fn apply(&mut self, store: &mut dyn NodeStore) -> Result<()> {
        if let Some((_, n)) = self.held.iter().find(|(_, n)| store.node(n.id()).is_some()) {
            return Err(EditError::DuplicateNode(n.id()));
        }
        for (index, node) in self.held.drain(..) {
            let at = index.unwrap_or(store.len()).min(store.len());
            store.insert(at, node)?;
        }
        Ok(())
    }

    fn undo(&mut self, store: &mut dyn NodeStore) -> Result<()> {
        if let Some(id) = self.ids.iter().find(|id| store.node(**id).is_none()) {
            return Err(EditError::NodeNotFound(*id));
        }
        let mut held = Vec::with_capacity(self.ids.len());
        for id in self.ids.iter().rev() {
            if let Some((index, node)) = store.remove(*id) {
                held.push((Some(index), node));
            }
        }
        // reinsert in reverse removal order
        held.reverse();
        self.held = held;
        Ok(())
    }
}

/// Remove nodes, remembering their stacking index so undo restores order.
#[derive(Debug)]
pub struct RemoveNodes {
    desc: String,
    ids: Vec<NodeId>,
    removed: Vec<(usize, GraphNode)>,
}

impl RemoveNodes {
    pub fn new(desc: impl Into<String>, ids: Vec<NodeId>) -> Self {
        RemoveNodes { desc: desc.into(), ids, removed: Vec::new() }
    }
}

impl Command for RemoveNodes {
    fn desc(&self) -> &str { &self.desc }

    fn apply(&mut self, store: &mut dyn NodeStore) -> Result<()> {
        if let Some(id) = self.ids.iter().find(|id| store.node(**id).is_none()) {
            return Err(EditError::NodeNotFound(*id));
        }
        self.removed.clear();
        for id in &self.ids {
            if let Some(entry) = store.remove(*id) {
                self.removed.push(entry);
            }
        }
        Ok(())
    }

    fn undo(&mut self, store: &mut dyn NodeStore) -> Result<()> {
        while let Some((index, node)) = self.removed.pop() {
            store.insert(index, node)?;
        }
        Ok(())
    }
}
