use vecedit::command::{AddNodes, AttrChange, SetAttrs};
use vecedit::{
    CommandStack, EditError, EditorEffect, GraphNode, NodeId, NodePatch, NodeStore, Point, Scene, Transform,
    TransformRect,
};
use wasm_bindgen::prelude::*;

mod api;
mod error;
mod interop;

/// Node id as the host sees it. Imports reject larger ids.
pub(crate) fn js_id(id: NodeId) -> vecedit::Result<u32> {
    u32::try_from(id.0).map_err(|_| EditError::Limit(format!("node id {id} does not fit in u32")))
}

// In-flight drag: what the node looked like when it started.
pub(crate) struct Gesture {
    pub(crate) id: NodeId,
    pub(crate) original: TransformRect,
    pub(crate) transform: Transform,
    pub(crate) center: Point,
    pub(crate) before: NodePatch,
}

#[wasm_bindgen]
pub struct Editor {
    pub(crate) scene: Scene,
    pub(crate) stack: CommandStack,
    pub(crate) effects: Vec<EditorEffect>,
    pub(crate) gesture: Option<Gesture>,
}

impl Editor {
    pub fn rs_new() -> Editor {
        let scene = Scene::new();
        let stack = CommandStack::from_settings(&scene.settings);
        Editor { scene, stack, effects: Vec::new(), gesture: None }
    }

    pub(crate) fn insert_node(&mut self, node: GraphNode) -> vecedit::Result<u32> {
        let id = js_id(node.id())?;
        let desc = format!("add {}", node.name());
        self.stack.execute(Box::new(AddNodes::new(desc, vec![node])), &mut self.scene)?;
        Ok(id)
    }

    pub(crate) fn set_attrs(&mut self, desc: &str, patches: Vec<(NodeId, NodePatch)>) -> vecedit::Result<()> {
        let cmd = SetAttrs::capture(desc, &self.scene, patches)?;
        self.stack.execute(Box::new(cmd), &mut self.scene)
    }

    /// Run an in-place edit and record it as a full before/after snapshot.
    pub(crate) fn record_edit(
        &mut self,
        id: NodeId,
        desc: &str,
        edit: impl FnOnce(&mut GraphNode) -> bool,
    ) -> vecedit::Result<bool> {
        let node = self.scene.node_mut(id).ok_or(EditError::NodeNotFound(id))?;
        let before = node.snapshot();
        if !edit(&mut *node) {
            return Ok(false);
        }
        let after = node.snapshot();
        if before != after {
            self.stack.push(Box::new(SetAttrs::new(desc, vec![AttrChange { id, before, after }])));
        }
        Ok(true)
    }
}
