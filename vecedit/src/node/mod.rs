//! Scene-graph nodes: identity, geometric attributes, cached bounds and the
//! single mutation entry point [`GraphNode::update_attrs`].

pub mod ident;
pub mod path;
pub mod record;

use crate::error::{EditError, Result};
use crate::geometry::affine::Transform;
use crate::geometry::resize::{resize_line, resize_rect, HandleKind};
use crate::geometry::shapes::{
    is_box_contain, is_box_intersect, is_point_in_rect, rect_to_vertices, Bounds, Point, Rect,
    TransformRect,
};
use crate::geometry::tolerance::{is_right_angle, near_zero, EPS_POS};
use ident::IdAllocator;
use path::PathData;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::cell::Cell;
use std::fmt;

/// Default angle step for keep-polar line resizing.
pub const DEFAULT_LINE_SNAP_STEP: f64 = std::f64::consts::FRAC_PI_4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Rect,
    Ellipse,
    Line,
    Path,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Rect => "Rect",
            NodeKind::Ellipse => "Ellipse",
            NodeKind::Line => "Line",
            NodeKind::Path => "Path",
        }
    }
}

/// Per-kind payload. Geometry queries only read the shared width/height/transform.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Rect { corner_radius: Option<f64> },
    Ellipse,
    Line,
    Path(PathData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Rect { .. } => NodeKind::Rect,
            NodeData::Ellipse => NodeKind::Ellipse,
            NodeData::Line => NodeKind::Line,
            NodeData::Path(_) => NodeKind::Path,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

/// Fill/stroke descriptor; opaque to the geometry core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "attrs", rename_all = "lowercase")]
pub enum Paint {
    Solid(Rgba),
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeAttrs {
    pub width: f64,
    pub height: f64,
    pub transform: Transform,
    pub stroke_width: f64,
    pub visible: bool,
    pub lock: bool,
    pub fill: Vec<Paint>,
    pub stroke: Vec<Paint>,
    pub extra: Map<String, Value>,
}

/// Partial attribute set fed to [`GraphNode::update_attrs`].
///
/// Keys not named here land in `extra` and are merged key by key; a `null`
/// value removes the key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Vec<Paint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Vec<Paint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `Some(None)` (JSON `null`) clears the radius.
    #[serde(deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_data: Option<PathData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn present_or_null<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Option<f64>>, D::Error> {
    Option::<f64>::deserialize(d).map(Some)
}

impl NodePatch {
    pub fn transform(t: Transform) -> Self {
        NodePatch { transform: Some(t), ..Default::default() }
    }

    pub fn position(x: f64, y: f64) -> Self {
        NodePatch { x: Some(x), y: Some(y), ..Default::default() }
    }

    fn touches_geometry(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.transform.is_some()
            || self.rotate.is_some()
            || self.path_data.is_some()
    }
}

/// Construction options; anything left `None` gets a default.
#[derive(Clone, Debug, Default)]
pub struct NodeInit {
    pub id: Option<NodeId>,
    pub name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: f64,
    pub height: f64,
    pub transform: Option<Transform>,
    pub stroke_width: f64,
    pub fill: Vec<Paint>,
    pub stroke: Vec<Paint>,
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    id: NodeId,
    name: String,
    attrs: NodeAttrs,
    data: NodeData,
    // top-left of a path's control polygon in local space; zero otherwise
    origin: Point,
    // Both caches are cleared together on any geometry change.
    bbox: Cell<Option<Bounds>>,
    bbox_with_stroke: Cell<Option<Bounds>>,
}

impl GraphNode {
    pub fn new(ids: &mut IdAllocator, data: NodeData, init: NodeInit) -> GraphNode {
        let kind = data.kind();
        let id = match init.id {
            Some(id) => {
                ids.reserve(id);
                id
            }
            None => ids.next_id(),
        };
        let name = match init.name {
            Some(n) => {
                ids.observe_name(kind, &n);
                n
            }
            None => ids.next_name(kind),
        };
        let transform = init
            .transform
            .unwrap_or(Transform::IDENTITY)
            .translated(init.x.unwrap_or(0.0), init.y.unwrap_or(0.0));
        let mut node = GraphNode {
            id,
            name,
            attrs: NodeAttrs {
                width: init.width,
                height: init.height,
                transform,
                stroke_width: init.stroke_width,
                visible: true,
                lock: false,
                fill: init.fill,
                stroke: init.stroke,
                extra: Map::new(),
            },
            data,
            origin: Point::ZERO,
            bbox: Cell::new(None),
            bbox_with_stroke: Cell::new(None),
        };
        node.refresh_path_extent(false);
        node
    }

    pub fn rect(ids: &mut IdAllocator, x: f64, y: f64, width: f64, height: f64) -> GraphNode {
        let init = NodeInit { x: Some(x), y: Some(y), width, height, ..Default::default() };
        GraphNode::new(ids, NodeData::Rect { corner_radius: None }, init)
    }

    pub fn ellipse(ids: &mut IdAllocator, x: f64, y: f64, width: f64, height: f64) -> GraphNode {
        let init = NodeInit { x: Some(x), y: Some(y), width, height, ..Default::default() };
        GraphNode::new(ids, NodeData::Ellipse, init)
    }

    /// A line is a zero-height node rotated to point from `from` to `to`.
    pub fn line(ids: &mut IdAllocator, from: Point, to: Point, stroke_width: f64) -> GraphNode {
        let d = to - from;
        let init = NodeInit {
            width: d.length(),
            height: 0.0,
            transform: Some(Transform::rotation(d.y.atan2(d.x)).translated(from.x, from.y)),
            stroke_width,
            ..Default::default()
        };
        GraphNode::new(ids, NodeData::Line, init)
    }

    /// Stored width and height are kept; only the path origin is derived.
    pub(crate) fn from_parts(id: NodeId, name: String, attrs: NodeAttrs, data: NodeData) -> GraphNode {
        let mut node = GraphNode {
            id,
            name,
            attrs,
            data,
            origin: Point::ZERO,
            bbox: Cell::new(None),
            bbox_with_stroke: Cell::new(None),
        };
        node.refresh_path_extent(true);
        node
    }

    pub fn id(&self) -> NodeId { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn kind(&self) -> NodeKind { self.data.kind() }
    pub fn attrs(&self) -> &NodeAttrs { &self.attrs }
    pub fn data(&self) -> &NodeData { &self.data }
    pub fn width(&self) -> f64 { self.attrs.width }
    pub fn height(&self) -> f64 { self.attrs.height }
    pub fn transform(&self) -> Transform { self.attrs.transform }
    pub fn x(&self) -> f64 { self.attrs.transform.tx }
    pub fn y(&self) -> f64 { self.attrs.transform.ty }
    pub fn rotate(&self) -> f64 { self.attrs.transform.rotation_angle() }
    pub fn is_visible(&self) -> bool { self.attrs.visible }
    pub fn is_locked(&self) -> bool { self.attrs.lock }

    /// The node's box as a sized frame. For paths the frame starts at the
    /// control polygon's origin rather than at local `(0, 0)`.
    pub fn transform_rect(&self) -> TransformRect {
        TransformRect { width: self.attrs.width, height: self.attrs.height, transform: self.frame_transform() }
    }

    fn frame_transform(&self) -> Transform {
        if self.origin == Point::ZERO {
            self.attrs.transform
        } else {
            self.attrs.transform.prepend(Transform::translation(self.origin.x, self.origin.y))
        }
    }

    /// Scene-space centre of the frame.
    pub fn center(&self) -> Point {
        self.frame_transform().apply(Point::new(self.attrs.width / 2.0, self.attrs.height / 2.0))
    }

    pub fn has_cached_bbox(&self) -> bool {
        self.bbox.get().is_some() || self.bbox_with_stroke.get().is_some()
    }

    fn clear_bbox_cache(&self) {
        self.bbox.set(None);
        self.bbox_with_stroke.set(None);
    }

    fn set_transform(&mut self, t: Transform) {
        if t != self.attrs.transform {
            self.clear_bbox_cache();
            self.attrs.transform = t;
        }
    }

    /// Merge `patch` into the node. Never fails.
    ///
    /// An explicit `transform` wins over `x`/`y` in the same patch; `rotate`
    /// is applied last as an absolute rotation about the node centre. Caches
    /// are dropped only when a geometric value actually changes.
    pub fn update_attrs(&mut self, patch: &NodePatch) {
        if patch.touches_geometry() {
            let mut next = self.attrs.transform;
            match patch.transform {
                Some(t) => next = t,
                None => {
                    if let Some(x) = patch.x { next.tx = x; }
                    if let Some(y) = patch.y { next.ty = y; }
                }
            }
            let changed = next != self.attrs.transform
                || patch.width.is_some_and(|w| w != self.attrs.width)
                || patch.height.is_some_and(|h| h != self.attrs.height);
            if changed {
                self.clear_bbox_cache();
            }
            self.attrs.transform = next;
            if let Some(w) = patch.width { self.attrs.width = w; }
            if let Some(h) = patch.height { self.attrs.height = h; }
        }

        if let Some(sw) = patch.stroke_width {
            if sw != self.attrs.stroke_width {
                // the stroke bbox depends on it; drop both to keep them paired
                self.clear_bbox_cache();
                self.attrs.stroke_width = sw;
            }
        }
        if let Some(v) = patch.visible { self.attrs.visible = v; }
        if let Some(l) = patch.lock { self.attrs.lock = l; }
        if let Some(f) = &patch.fill { self.attrs.fill = f.clone(); }
        if let Some(s) = &patch.stroke { self.attrs.stroke = s.clone(); }
        if let Some(n) = &patch.name { self.name = n.clone(); }
        let (id, kind) = (self.id, self.kind());
        if let Some(r) = patch.corner_radius {
            match &mut self.data {
                NodeData::Rect { corner_radius } => *corner_radius = r,
                _ => tracing::warn!(%id, "corner radius ignored on {:?}", kind),
            }
        }
        for (k, v) in &patch.extra {
            if v.is_null() {
                self.attrs.extra.remove(k);
            } else {
                self.attrs.extra.insert(k.clone(), v.clone());
            }
        }

        if let Some(pd) = &patch.path_data {
            let replaced = match &mut self.data {
                NodeData::Path(data) if *data != *pd => {
                    *data = pd.clone();
                    true
                }
                NodeData::Path(_) => false,
                _ => {
                    tracing::warn!(%id, "path data ignored on {:?}", kind);
                    false
                }
            };
            if replaced {
                // a full snapshot carries its own size
                self.refresh_path_extent(patch.width.is_some() && patch.height.is_some());
            }
        }

        if let Some(angle) = patch.rotate {
            self.set_rotate(angle, None);
        }
    }

    /// Full attribute snapshot; applying it restores this exact state.
    pub fn snapshot(&self) -> NodePatch {
        let a = &self.attrs;
        NodePatch {
            width: Some(a.width),
            height: Some(a.height),
            transform: Some(a.transform),
            stroke_width: Some(a.stroke_width),
            visible: Some(a.visible),
            lock: Some(a.lock),
            fill: Some(a.fill.clone()),
            stroke: Some(a.stroke.clone()),
            name: Some(self.name.clone()),
            corner_radius: match self.data {
                NodeData::Rect { corner_radius } => Some(corner_radius),
                _ => None,
            },
            path_data: match &self.data {
                NodeData::Path(pd) => Some(pd.clone()),
                _ => None,
            },
            extra: a.extra.clone(),
            ..Default::default()
        }
    }

    /// Current values of exactly the attributes `patch` would touch, so that
    /// applying the result undoes `patch`.
    pub fn snapshot_for(&self, patch: &NodePatch) -> NodePatch {
        let a = &self.attrs;
        let full = self.snapshot();
        let geometric = patch.x.is_some() || patch.y.is_some() || patch.transform.is_some() || patch.rotate.is_some();
        let path = patch.path_data.is_some();
        NodePatch {
            width: (patch.width.is_some() || path).then_some(a.width),
            height: (patch.height.is_some() || path).then_some(a.height),
            transform: (geometric || path).then_some(a.transform),
            stroke_width: patch.stroke_width.map(|_| a.stroke_width),
            visible: patch.visible.map(|_| a.visible),
            lock: patch.lock.map(|_| a.lock),
            fill: patch.fill.as_ref().and(full.fill),
            stroke: patch.stroke.as_ref().and(full.stroke),
            name: patch.name.as_ref().and(full.name),
            corner_radius: patch.corner_radius.and(full.corner_radius),
            path_data: patch.path_data.as_ref().and(full.path_data),
            extra: patch
                .extra
                .keys()
                .map(|k| (k.clone(), a.extra.get(k).cloned().unwrap_or(Value::Null)))
                .collect(),
            ..Default::default()
        }
    }

    /// Geometry-only bounds, computed from the transformed local corners on first access.
    pub fn get_bbox(&self) -> Bounds {
        if let Some(b) = self.bbox.get() {
            return b;
        }
        let b = self.compute_bounds(0.0);
        tracing::trace!(id = %self.id, ?b, "bbox recomputed");
        self.bbox.set(Some(b));
        b
    }

    /// Bounds inflated by half the stroke width before transforming.
    pub fn get_bbox_with_stroke(&self) -> Bounds {
        if let Some(b) = self.bbox_with_stroke.get() {
            return b;
        }
        let b = self.compute_bounds(self.attrs.stroke_width / 2.0);
        self.bbox_with_stroke.set(Some(b));
        b
    }

    fn compute_bounds(&self, inflate: f64) -> Bounds {
        let local = Rect::new(
            -inflate,
            -inflate,
            self.attrs.width + inflate * 2.0,
            self.attrs.height + inflate * 2.0,
        );
        Bounds::from_quad(&rect_to_vertices(&local, Some(&self.frame_transform())))
    }

    pub fn hit_test(&self, x: f64, y: f64, padding: f64) -> bool {
        is_point_in_rect(
            Point::new(x, y),
            &self.transform_rect(),
            padding + self.attrs.stroke_width / 2.0,
        )
    }

    /// Exact rectangle vs axis-aligned box test.
    ///
    /// The bbox reject covers the scene axes; for non-right-angle rotations the
    /// box is inverse-mapped into the local frame and its bounds are tested
    /// against `[0,0,width,height]`, which covers the node's own axes.
    pub fn intersect_with_box(&self, b: &Bounds) -> bool {
        if !is_box_intersect(&self.get_bbox(), b) {
            return false;
        }
        if is_right_angle(self.rotate()) {
            return true;
        }
        let inv = self.frame_transform().invert();
        let corners = rect_to_vertices(&b.to_rect(), Some(&inv));
        let local = Bounds::from_quad(&corners);
        is_box_intersect(&local, &Bounds::new(0.0, 0.0, self.attrs.width, self.attrs.height))
    }

    /// True if either AABB fully contains the other.
    pub fn contain_with_box(&self, b: &Bounds) -> bool {
        let own = self.get_bbox();
        is_box_contain(b, &own) || is_box_contain(&own, b)
    }

    /// Resize from a drag on `handle`, starting from the `original` snapshot taken at drag start.
    pub fn update_by_control_handle(
        &mut self,
        handle: HandleKind,
        pointer: Point,
        original: &TransformRect,
        keep_ratio: bool,
        from_center: bool,
    ) -> Result<()> {
        self.resize_by_handle(handle, pointer, original, keep_ratio, from_center, DEFAULT_LINE_SNAP_STEP)
    }

    pub fn resize_by_handle(
        &mut self,
        handle: HandleKind,
        pointer: Point,
        original: &TransformRect,
        keep_ratio: bool,
        from_center: bool,
        line_snap_step: f64,
    ) -> Result<()> {
        let next = if near_zero(original.height, EPS_POS) {
            resize_line(handle, pointer, original, keep_ratio, from_center, line_snap_step)?
        } else {
            resize_rect(handle, pointer, original, keep_ratio, from_center)
        };
        // `original` is a frame; move back to the node origin
        let transform = if self.origin == Point::ZERO {
            next.transform
        } else {
            next.transform.prepend(Transform::translation(-self.origin.x, -self.origin.y))
        };
        self.update_attrs(&NodePatch {
            width: Some(next.width),
            height: Some(next.height),
            transform: Some(transform),
            ..Default::default()
        });
        Ok(())
    }

    /// Absolute rotation about `center` (node centre when `None`). Scale, skew
    /// and position relative to the pivot are preserved.
    pub fn set_rotate(&mut self, angle: f64, center: Option<Point>) {
        let center = center.unwrap_or_else(|| self.center());
        let delta = angle - self.rotate();
        let next = self.attrs.transform.append(Transform::rotation_about(delta, center));
        self.set_transform(next);
    }

    /// Rotate by `delta` relative to `original`, the transform at drag start.
    pub fn d_rotate(&mut self, delta: f64, original: Transform, center: Point) {
        self.set_transform(original.append(Transform::rotation_about(delta, center)));
    }

    /// Translate every node by `(dx, dy)`. Plain iteration; grouping into one
    /// undo step is the command layer's job.
    pub fn d_move<'a, I>(nodes: I, dx: f64, dy: f64)
    where
        I: IntoIterator<Item = &'a mut GraphNode>,
    {
        for node in nodes {
            let t = node.attrs.transform.translated(dx, dy);
            node.update_attrs(&NodePatch::transform(t));
        }
    }

    pub(crate) fn expect_kind(&self, kind: NodeKind) -> Result<()> {
        if self.kind() == kind {
            Ok(())
        } else {
            Err(EditError::KindMismatch { id: self.id, expected: kind.label().to_lowercase() })
        }
    }
}
