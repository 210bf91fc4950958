//! Ordered node container. Index 0 is the bottom of the stacking order.

use crate::error::{EditError, Result};
use crate::geometry::limits;
use crate::geometry::resize::HandleKind;
use crate::geometry::shapes::{Bounds, Point, TransformRect};
use crate::node::ident::IdAllocator;
use crate::node::record::NodeRecord;
use crate::node::{GraphNode, NodeId, NodeKind};
use crate::settings::{BoxSelect, Settings};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// What commands need from whoever owns the nodes.
pub trait NodeStore {
    fn node(&self, id: NodeId) -> Option<&GraphNode>;
    fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode>;
    fn index_of(&self, id: NodeId) -> Option<usize>;
    /// Insert at `index` (clamped to the end). Fails on a duplicate id.
    fn insert(&mut self, index: usize, node: GraphNode) -> Result<()>;
    fn remove(&mut self, id: NodeId) -> Option<(usize, GraphNode)>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
}

pub const DOC_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Doc {
    version: u32,
    nodes: Vec<NodeRecord>,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<GraphNode>,
    pub settings: Settings,
    pub ids: IdAllocator,
}

impl Scene {
    pub fn new() -> Self { Self::default() }

    pub fn with_settings(settings: Settings) -> Self {
        Scene { settings, ..Default::default() }
    }

    pub fn nodes(&self) -> &[GraphNode] { &self.nodes }

    pub fn add_items(&mut self, nodes: Vec<GraphNode>) -> Result<()> {
        for node in nodes {
            let at = self.nodes.len();
            self.insert(at, node)?;
        }
        Ok(())
    }

    pub fn remove_items(&mut self, ids: &[NodeId]) -> Vec<GraphNode> {
        ids.iter().filter_map(|id| self.remove(*id)).map(|(_, n)| n).collect()
    }

    /// Top-most visible, unlocked node under `(x, y)`.
    pub fn pick(&self, x: f64, y: f64) -> Option<NodeId> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.is_visible() && !n.is_locked() && n.hit_test(x, y, self.settings.hit_padding))
            .map(|n| n.id())
    }

    /// Visible, unlocked nodes selected by a marquee, bottom to top.
    pub fn nodes_in_box(&self, b: &Bounds) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.is_visible() && !n.is_locked())
            .filter(|n| match self.settings.box_select {
                BoxSelect::Intersect => n.intersect_with_box(b),
                BoxSelect::Contain => n.contain_with_box(b),
            })
            .map(|n| n.id())
            .collect()
    }

    /// Union of the nodes' bounds; `None` when no id resolves.
    pub fn bbox_of(&self, ids: &[NodeId]) -> Option<Bounds> {
        ids.iter()
            .filter_map(|id| self.node(*id))
            .map(|n| n.get_bbox())
            .reduce(|a, b| a.union(&b))
    }

    pub fn move_nodes(&mut self, ids: &[NodeId], dx: f64, dy: f64) {
        GraphNode::d_move(self.nodes.iter_mut().filter(|n| ids.contains(&n.id())), dx, dy);
    }

    /// Mutable access to a node that must be a path.
    pub fn path_node_mut(&mut self, id: NodeId) -> Result<&mut GraphNode> {
        let node = self.node_mut(id).ok_or(EditError::NodeNotFound(id))?;
        node.expect_kind(NodeKind::Path)?;
        Ok(node)
    }

    /// Resize with the scene's line snap step.
    pub fn resize_node(
        &mut self,
        id: NodeId,
        handle: HandleKind,
        pointer: Point,
        original: &TransformRect,
        keep_ratio: bool,
        from_center: bool,
    ) -> Result<()> {
        let step = self.settings.line_snap_step;
        let node = self.node_mut(id).ok_or(EditError::NodeNotFound(id))?;
        node.resize_by_handle(handle, pointer, original, keep_ratio, from_center, step)
    }

    pub fn to_json_value(&self) -> Value {
        let doc = Doc { version: DOC_VERSION, nodes: self.nodes.iter().map(|n| n.to_record()).collect() };
        serde_json::to_value(doc).unwrap_or(Value::Null)
    }

    /// Replace the contents with a document. On error the scene is unchanged.
    pub fn from_json_value(&mut self, v: Value) -> Result<()> {
        let doc: Doc = serde_json::from_value(v)?;
        if doc.nodes.len() > limits::MAX_NODES {
            return Err(EditError::Limit(format!("{} nodes", doc.nodes.len())));
        }
        let mut ids = IdAllocator::new();
        let mut seen = HashSet::with_capacity(doc.nodes.len());
        let mut nodes: Vec<GraphNode> = Vec::with_capacity(doc.nodes.len());
        for rec in doc.nodes {
            if !seen.insert(rec.id) {
                return Err(EditError::DuplicateNode(rec.id));
            }
            nodes.push(GraphNode::from_record(rec, &mut ids)?);
        }
        tracing::debug!(count = nodes.len(), "scene loaded");
        self.nodes = nodes;
        self.ids = ids;
        Ok(())
    }
}

impl NodeStore for Scene {
    fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id() == id)
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == id)
    }

    fn insert(&mut self, index: usize, node: GraphNode) -> Result<()> {
        if self.index_of(node.id()).is_some() {
            return Err(EditError::DuplicateNode(node.id()));
        }
        self.ids.reserve(node.id());
        let at = index.min(self.nodes.len());
        self.nodes.insert(at, node);
        Ok(())
    }

    fn remove(&mut self, id: NodeId) -> Option<(usize, GraphNode)> {
        let i = self.index_of(id)?;
        Some((i, self.nodes.remove(i)))
    }

    fn len(&self) -> usize { self.nodes.len() }
}
