use crate::error;
use crate::interop::{from_js, ids_from_js, ids_to_js, to_js};
use crate::{Editor, Gesture};
use js_sys::Uint32Array;
use vecedit::command::{AttrChange, RemoveNodes, SetAttrs};
use vecedit::node::NodeInit;
use vecedit::{
    Bounds, EditError, EditorEffect, GraphNode, HandleKind, NodeData, NodeId, NodePatch, NodeStore, PathData,
    Point, Segment, Settings,
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn nid(id: u32) -> NodeId { NodeId(u64::from(id)) }


#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        crate::Editor::rs_new()
    }

    pub fn load_settings_res(&mut self, json: &str) -> JsValue {
        match Settings::from_json_str(json) {
            Ok(s) => {
                self.stack = vecedit::CommandStack::from_settings(&s);
                self.scene.settings = s;
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::from_edit(&e),
        }
    }

    pub fn node_count(&self) -> u32 {
        self.scene.len() as u32
    }

    pub fn node_ids(&self) -> Uint32Array {
        ids_to_js(&self.scene.nodes().iter().map(|n| n.id()).collect::<Vec<_>>())
    }

    // Creation
    pub fn add_rect_res(&mut self, x: f64, y: f64, width: f64, height: f64) -> JsValue {
        if let Some(e) = error::check_finite(&[("x", x), ("y", y), ("width", width), ("height", height)]) {
            return e;
        }
        let node = GraphNode::rect(&mut self.scene.ids, x, y, width, height);
        error::wrap(self.insert_node(node).map(|id| JsValue::from_f64(id as f64)))
    }
    pub fn add_ellipse_res(&mut self, x: f64, y: f64, width: f64, height: f64) -> JsValue {
        if let Some(e) = error::check_finite(&[("x", x), ("y", y), ("width", width), ("height", height)]) {
            return e;
        }
        let node = GraphNode::ellipse(&mut self.scene.ids, x, y, width, height);
        error::wrap(self.insert_node(node).map(|id| JsValue::from_f64(id as f64)))
    }
    pub fn add_line_res(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke_width: f64) -> JsValue {
        let params = [("x1", x1), ("y1", y1), ("x2", x2), ("y2", y2), ("stroke_width", stroke_width)];
        if let Some(e) = error::check_finite(&params) {
            return e;
        }
        let node = GraphNode::line(&mut self.scene.ids, Point::new(x1, y1), Point::new(x2, y2), stroke_width);
        error::wrap(self.insert_node(node).map(|id| JsValue::from_f64(id as f64)))
    }
    /// Empty path node; its frame follows the segments added to it.
    pub fn add_path_res(&mut self, stroke_width: f64) -> JsValue {
        if let Some(e) = error::check_finite(&[("stroke_width", stroke_width)]) {
            return e;
        }
        let init = NodeInit { stroke_width, ..Default::default() };
        let node = GraphNode::new(&mut self.scene.ids, NodeData::Path(PathData::default()), init);
        error::wrap(self.insert_node(node).map(|id| JsValue::from_f64(id as f64)))
    }
    pub fn remove_nodes_res(&mut self, ids: &Uint32Array) -> JsValue {
        let ids = ids_from_js(ids);
        let cmd = RemoveNodes::new("remove", ids);
        error::wrap(self.stack.execute(Box::new(cmd), &mut self.scene).map(|_| JsValue::TRUE))
    }

    // Attributes
    pub fn get_node_res(&self, id: u32) -> JsValue {
        match self.scene.node(nid(id)) {
            Some(n) => match to_js(&n.to_record()) {
                Ok(v) => error::ok(v),
                Err(e) => error::json(format!("{:?}", e)),
            },
            None => error::invalid_id(id),
        }
    }
    /// Merge a JSON patch into the node and record it for undo.
    pub fn update_attrs_res(&mut self, id: u32, patch: JsValue) -> JsValue {
        let patch: NodePatch = match from_js(patch) {
            Ok(p) => p,
            Err(msg) => return error::json(msg),
        };
        if self.scene.node(nid(id)).is_none() {
            return error::invalid_id(id);
        }
        error::wrap(self.set_attrs("update attrs", vec![(nid(id), patch)]).map(|_| JsValue::TRUE))
    }
    pub fn get_bbox_res(&self, id: u32, with_stroke: bool) -> JsValue {
        let Some(n) = self.scene.node(nid(id)) else { return error::invalid_id(id) };
        let b = if with_stroke { n.get_bbox_with_stroke() } else { n.get_bbox() };
        match to_js(&b) {
            Ok(v) => error::ok(v),
            Err(e) => error::json(format!("{:?}", e)),
        }
    }
    pub fn get_rotate(&self, id: u32) -> Option<f64> {
        self.scene.node(nid(id)).map(|n| n.rotate())
    }

    // Queries
    pub fn pick(&self, x: f64, y: f64) -> Option<u32> {
        self.scene.pick(x, y).and_then(|id| crate::js_id(id).ok())
    }
    pub fn nodes_in_box_res(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> JsValue {
        let params = [("min_x", min_x), ("min_y", min_y), ("max_x", max_x), ("max_y", max_y)];
        if let Some(e) = error::check_finite(&params) {
            return e;
        }
        let b = Bounds::new(min_x.min(max_x), min_y.min(max_y), min_x.max(max_x), min_y.max(max_y));
        error::ok(ids_to_js(&self.scene.nodes_in_box(&b)).into())
    }
    pub fn bbox_of_res(&self, ids: &Uint32Array) -> JsValue {
        let ids = ids_from_js(ids);
        match self.scene.bbox_of(&ids) {
            Some(b) => to_js(&b).map(error::ok).unwrap_or_else(|e| error::json(format!("{:?}", e))),
            None => error::ok(JsValue::NULL),
        }
    }

    // One-shot transforms
    pub fn move_nodes_res(&mut self, ids: &Uint32Array, dx: f64, dy: f64) -> JsValue {
        if let Some(e) = error::check_finite(&[("dx", dx), ("dy", dy)]) {
            return e;
        }
        let mut patches = Vec::new();
        for raw in ids.to_vec() {
            let Some(n) = self.scene.node(nid(raw)) else { return error::invalid_id(raw) };
            patches.push((n.id(), NodePatch::transform(n.transform().translated(dx, dy))));
        }
        error::wrap(self.set_attrs("move", patches).map(|_| JsValue::TRUE))
    }
    /// Absolute rotation about the node centre.
    pub fn rotate_res(&mut self, id: u32, angle: f64) -> JsValue {
        if let Some(e) = error::check_finite(&[("angle", angle)]) {
            return e;
        }
        if self.scene.node(nid(id)).is_none() {
            return error::invalid_id(id);
        }
        let patch = NodePatch { rotate: Some(angle), ..Default::default() };
        error::wrap(self.set_attrs("rotate", vec![(nid(id), patch)]).map(|_| JsValue::TRUE))
    }

    // Drag gestures: live preview, recorded once on end
    pub fn begin_gesture_res(&mut self, id: u32) -> JsValue {
        let Some(n) = self.scene.node(nid(id)) else { return error::invalid_id(id) };
        self.gesture = Some(Gesture {
            id: n.id(),
            original: n.transform_rect(),
            transform: n.transform(),
            center: n.center(),
            before: n.snapshot(),
        });
        error::ok(JsValue::TRUE)
    }
    pub fn resize_to_res(&mut self, handle: &str, x: f64, y: f64, keep_ratio: bool, from_center: bool) -> JsValue {
        if let Some(e) = error::check_finite(&[("x", x), ("y", y)]) {
            return e;
        }
        let handle: HandleKind = match handle.parse() {
            Ok(h) => h,
            Err(e) => return error::from_edit(&e),
        };
        let Some(g) = &self.gesture else { return error::no_gesture() };
        let (id, original) = (g.id, g.original);
        let r = self.scene.resize_node(id, handle, Point::new(x, y), &original, keep_ratio, from_center);
        error::wrap(r.map(|_| JsValue::TRUE))
    }
    pub fn rotate_by_res(&mut self, delta: f64) -> JsValue {
        if let Some(e) = error::check_finite(&[("delta", delta)]) {
            return e;
        }
        let Some(g) = &self.gesture else { return error::no_gesture() };
        let (id, original, center) = (g.id, g.transform, g.center);
        match self.scene.node_mut(id) {
            Some(n) => {
                n.d_rotate(delta, original, center);
                error::ok(JsValue::TRUE)
            }
            None => error::from_edit(&EditError::NodeNotFound(id)),
        }
    }
    /// Record the gesture as one undo step. Returns `false` if nothing changed.
    pub fn end_gesture_res(&mut self, desc: &str) -> JsValue {
        let Some(g) = self.gesture.take() else { return error::no_gesture() };
        let Some(n) = self.scene.node(g.id) else { return error::from_edit(&EditError::NodeNotFound(g.id)) };
        let after = n.snapshot();
        if after == g.before {
            return error::ok(JsValue::FALSE);
        }
        let change = AttrChange { id: g.id, before: g.before, after };
        self.stack.push(Box::new(SetAttrs::new(desc, vec![change])));
        error::ok(JsValue::TRUE)
    }
    pub fn cancel_gesture(&mut self) {
        if let Some(g) = self.gesture.take() {
            if let Some(n) = self.scene.node_mut(g.id) {
                n.update_attrs(&g.before);
            }
        }
    }

    // Path drawing. Points are in scene coordinates.
    pub fn begin_path_draw_res(&mut self, id: u32) -> JsValue {
        let Some(n) = self.scene.node(nid(id)) else { return error::invalid_id(id) };
        if !n.is_path() {
            return error::from_edit(&EditError::KindMismatch { id: n.id(), expected: "path".into() });
        }
        let id = n.id();
        self.stack.batch_start_with_hooks("draw path", Some(EditorEffect::EnterPathEdit(id)), Some(EditorEffect::ExitPathEdit));
        error::ok(JsValue::TRUE)
    }
    pub fn end_path_draw(&mut self) {
        self.stack.batch_command_end();
    }
    pub fn add_seg_res(&mut self, id: u32, path_index: u32, x: f64, y: f64) -> JsValue {
        if let Some(e) = error::check_finite(&[("x", x), ("y", y)]) {
            return e;
        }
        if let Err(e) = self.scene.path_node_mut(nid(id)) {
            return error::from_edit(&e);
        }
        let r = self.record_edit(nid(id), "add segment", |n| {
            let seg = n.scene_to_local_seg(&Segment::anchor(x, y));
            n.add_seg(path_index as usize, seg)
        });
        error::wrap(r.map(JsValue::from_bool))
    }
    /// Out handle as a scene-space offset from the anchor.
    pub fn drag_out_handle_res(&mut self, id: u32, path_index: u32, seg_index: u32, dx: f64, dy: f64, alt: bool) -> JsValue {
        if let Some(e) = error::check_finite(&[("dx", dx), ("dy", dy)]) {
            return e;
        }
        if let Err(e) = self.scene.path_node_mut(nid(id)) {
            return error::from_edit(&e);
        }
        let r = self.record_edit(nid(id), "drag handle", |n| {
            let out = n.transform().invert().apply_vector(Point::new(dx, dy));
            n.drag_out_handle(path_index as usize, seg_index as usize, out, alt)
        });
        error::wrap(r.map(JsValue::from_bool))
    }
    pub fn close_path_res(&mut self, id: u32, path_index: u32) -> JsValue {
        if let Err(e) = self.scene.path_node_mut(nid(id)) {
            return error::from_edit(&e);
        }
        let r = self.record_edit(nid(id), "close path", |n| n.set_path_item_closed(path_index as usize, true));
        error::wrap(r.map(JsValue::from_bool))
    }
    pub fn is_near_start_anchor(&self, id: u32, path_index: u32, x: f64, y: f64, tolerance: f64) -> bool {
        self.scene
            .node(nid(id))
            .is_some_and(|n| n.is_near_start_anchor(path_index as usize, Point::new(x, y), tolerance))
    }
    pub fn get_seg_res(&self, id: u32, path_index: u32, seg_index: u32) -> JsValue {
        let Some(n) = self.scene.node(nid(id)) else { return error::invalid_id(id) };
        match n.get_seg(path_index as usize, seg_index as usize, true) {
            Some(s) => to_js(&s).map(error::ok).unwrap_or_else(|e| error::json(format!("{:?}", e))),
            None => error::ok(JsValue::NULL),
        }
    }

    // History
    pub fn batch_start(&mut self, desc: &str) {
        self.stack.batch_start(desc);
    }
    pub fn batch_end(&mut self) {
        self.stack.batch_command_end();
    }
    pub fn undo(&mut self) -> bool {
        self.stack.undo(&mut self.scene, &mut self.effects).unwrap_or(false)
    }
    pub fn undo_res(&mut self) -> JsValue {
        error::wrap(self.stack.undo(&mut self.scene, &mut self.effects).map(JsValue::from_bool))
    }
    pub fn redo(&mut self) -> bool {
        self.stack.redo(&mut self.scene, &mut self.effects).unwrap_or(false)
    }
    pub fn redo_res(&mut self) -> JsValue {
        error::wrap(self.stack.redo(&mut self.scene, &mut self.effects).map(JsValue::from_bool))
    }
    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }
    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }
    /// Effects queued by undo/redo hooks since the last call, oldest first.
    pub fn take_effects(&mut self) -> JsValue {
        let effects = std::mem::take(&mut self.effects);
        to_js(&effects).unwrap_or(JsValue::NULL)
    }

    // Persistence
    pub fn to_json(&self) -> JsValue {
        to_js(&self.scene.to_json_value()).unwrap_or(JsValue::NULL)
    }
    /// Replace the document and clear history. On error nothing changes.
    pub fn from_json_res(&mut self, v: JsValue) -> JsValue {
        let doc: serde_json::Value = match from_js(v) {
            Ok(d) => d,
            Err(msg) => return error::json(msg),
        };
        match self.scene.from_json_value(doc) {
            Ok(()) => {
                self.stack.clear();
                self.gesture = None;
                let summary = serde_json::json!({ "nodes": self.scene.len() });
                error::ok(to_js(&summary).unwrap_or(JsValue::NULL))
            }
            Err(e) => error::from_edit(&e),
        }
    }
}

impl Default for Editor {
    fn default() -> Self { Editor::new() }
}
