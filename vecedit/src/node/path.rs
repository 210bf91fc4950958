//! Path payload: sub-paths ("path items") of anchor segments with in/out handles.
//!
//! Segment coordinates live in the node's local frame and are stored exactly
//! as supplied. After every structural edit the node's extent is recomputed
//! from the control polygon; the transform never moves.

use super::{GraphNode, NodeData, NodeKind};
use crate::geometry::affine::Transform;
use crate::geometry::shapes::{Bounds, Point};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub point: Point,
    /// Incoming handle, relative to `point`.
    #[serde(rename = "in")]
    pub handle_in: Point,
    /// Outgoing handle, relative to `point`.
    #[serde(rename = "out")]
    pub handle_out: Point,
}

impl Segment {
    /// A straight-corner anchor: both handles zero.
    pub fn anchor(x: f64, y: f64) -> Self {
        Segment { point: Point::new(x, y), ..Default::default() }
    }

    pub fn with_handles(point: Point, handle_in: Point, handle_out: Point) -> Self {
        Segment { point, handle_in, handle_out }
    }

    /// Map through `t`; handles are offsets, so only the linear part applies.
    pub fn transformed(&self, t: &Transform) -> Segment {
        Segment {
            point: t.apply(self.point),
            handle_in: t.apply_vector(self.handle_in),
            handle_out: t.apply_vector(self.handle_out),
        }
    }

    fn apply(&mut self, patch: &SegmentPatch) {
        if let Some(p) = patch.point { self.point = p; }
        if let Some(h) = patch.handle_in { self.handle_in = h; }
        if let Some(h) = patch.handle_out { self.handle_out = h; }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub handle_in: Option<Point>,
    #[serde(rename = "out", skip_serializing_if = "Option::is_none")]
    pub handle_out: Option<Point>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    pub segs: Vec<Segment>,
    pub closed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathData {
    pub items: Vec<PathItem>,
}

impl PathData {
    pub fn new(items: Vec<PathItem>) -> Self { PathData { items } }

    pub fn add_empty_path(&mut self) -> usize {
        self.items.push(PathItem::default());
        self.items.len() - 1
    }

    /// Append to an existing sub-path, or start the next one when
    /// `path_index` is exactly one past the end.
    pub fn add_seg(&mut self, path_index: usize, seg: Segment) -> bool {
        if path_index == self.items.len() {
            self.items.push(PathItem { segs: vec![seg], closed: false });
            return true;
        }
        match self.items.get_mut(path_index) {
            Some(item) => {
                item.segs.push(seg);
                true
            }
            None => false,
        }
    }

    pub fn set_seg(&mut self, path_index: usize, seg_index: usize, patch: &SegmentPatch) -> bool {
        match self.items.get_mut(path_index).and_then(|it| it.segs.get_mut(seg_index)) {
            Some(seg) => {
                seg.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Closing needs at least two segments; reopening always succeeds.
    pub fn set_closed(&mut self, path_index: usize, closed: bool) -> bool {
        match self.items.get_mut(path_index) {
            Some(item) if closed && item.segs.len() < 2 => false,
            Some(item) => {
                item.closed = closed;
                true
            }
            None => false,
        }
    }

    pub fn item_count(&self) -> usize { self.items.len() }

    pub fn seg_count(&self, path_index: usize) -> Option<usize> {
        self.items.get(path_index).map(|it| it.segs.len())
    }

    pub fn seg(&self, path_index: usize, seg_index: usize) -> Option<&Segment> {
        self.items.get(path_index)?.segs.get(seg_index)
    }

    pub fn last_seg(&self, path_index: usize) -> Option<&Segment> {
        self.items.get(path_index)?.segs.last()
    }

    pub fn is_closed(&self, path_index: usize) -> bool {
        self.items.get(path_index).is_some_and(|it| it.closed)
    }

    /// Bounds of anchors and handle tips.
    pub fn control_bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.items.iter().flat_map(|it| it.segs.iter()).flat_map(|s| {
            [s.point, s.point + s.handle_in, s.point + s.handle_out]
        }))
    }
}

impl GraphNode {
    pub fn path_data(&self) -> Option<&PathData> {
        match &self.data {
            NodeData::Path(pd) => Some(pd),
            _ => None,
        }
    }

    fn edit_path<R>(&mut self, op: &str, f: impl FnOnce(&mut PathData) -> R) -> Option<R> {
        match &mut self.data {
            NodeData::Path(pd) => Some(f(pd)),
            _ => {
                tracing::warn!(id = %self.id, op, "path edit on a non-path node");
                None
            }
        }
    }

    /// Recompute the extent from the control polygon. Segments keep the
    /// coordinates they were given; `origin` tracks the polygon's top-left so
    /// bounds and picking follow it. Width and height are left alone when
    /// `keep_size` is set (restoring a snapshot or a stored record).
    pub(crate) fn refresh_path_extent(&mut self, keep_size: bool) {
        let NodeData::Path(pd) = &self.data else { return };
        let bounds = pd.control_bounds();
        self.clear_bbox_cache();
        self.origin = bounds.map_or(Point::ZERO, |b| Point::new(b.min_x, b.min_y));
        if !keep_size {
            let (w, h) = bounds.map_or((0.0, 0.0), |b| (b.width(), b.height()));
            self.attrs.width = w;
            self.attrs.height = h;
        }
    }

    pub fn add_empty_path(&mut self) -> Option<usize> {
        self.edit_path("add_empty_path", |pd| pd.add_empty_path())
    }

    /// `seg` is in local coordinates; see [`GraphNode::scene_to_local_seg`].
    pub fn add_seg(&mut self, path_index: usize, seg: Segment) -> bool {
        let ok = self.edit_path("add_seg", |pd| pd.add_seg(path_index, seg)).unwrap_or(false);
        if ok {
            self.refresh_path_extent(false);
        } else {
            tracing::warn!(id = %self.id, path_index, "add_seg: no such path item");
        }
        ok
    }

    pub fn set_seg(&mut self, path_index: usize, seg_index: usize, patch: &SegmentPatch) -> bool {
        let ok = self.edit_path("set_seg", |pd| pd.set_seg(path_index, seg_index, patch)).unwrap_or(false);
        if ok {
            self.refresh_path_extent(false);
        }
        ok
    }

    pub fn set_path_item_closed(&mut self, path_index: usize, closed: bool) -> bool {
        let ok = self.edit_path("set_path_item_closed", |pd| pd.set_closed(path_index, closed)).unwrap_or(false);
        if !ok {
            tracing::warn!(id = %self.id, path_index, closed, "sub-path close rejected");
        }
        ok
    }

    /// Set the out handle while dragging a new anchor. The in handle mirrors
    /// it unless `suppress_mirror` is set or the anchor starts its sub-path.
    pub fn drag_out_handle(&mut self, path_index: usize, seg_index: usize, out: Point, suppress_mirror: bool) -> bool {
        let patch = SegmentPatch {
            handle_out: Some(out),
            handle_in: (!suppress_mirror && seg_index > 0).then_some(-out),
            ..Default::default()
        };
        self.set_seg(path_index, seg_index, &patch)
    }

    pub fn get_path_item_count(&self) -> usize {
        self.path_data().map_or(0, |pd| pd.item_count())
    }

    pub fn has_path(&self, path_index: usize) -> bool {
        self.path_data().is_some_and(|pd| path_index < pd.item_count())
    }

    pub fn get_seg_count(&self, path_index: usize) -> Option<usize> {
        self.path_data()?.seg_count(path_index)
    }

    /// Segment in local space, or mapped into scene space when `in_scene` is set.
    pub fn get_seg(&self, path_index: usize, seg_index: usize, in_scene: bool) -> Option<Segment> {
        let seg = self.path_data()?.seg(path_index, seg_index)?;
        Some(if in_scene { seg.transformed(&self.attrs.transform) } else { *seg })
    }

    pub fn get_last_seg(&self, path_index: usize, in_scene: bool) -> Option<Segment> {
        let seg = self.path_data()?.last_seg(path_index)?;
        Some(if in_scene { seg.transformed(&self.attrs.transform) } else { *seg })
    }

    pub fn check_path_item_closed(&self, path_index: usize) -> bool {
        self.path_data().is_some_and(|pd| pd.is_closed(path_index))
    }

    pub fn scene_to_local_seg(&self, seg: &Segment) -> Segment {
        seg.transformed(&self.attrs.transform.invert())
    }

    /// Is scene point `p` within `tolerance` of the sub-path's first anchor?
    pub fn is_near_start_anchor(&self, path_index: usize, p: Point, tolerance: f64) -> bool {
        self.get_seg(path_index, 0, true)
            .is_some_and(|s| s.point.distance(p) <= tolerance)
    }

    pub fn is_path(&self) -> bool { self.kind() == NodeKind::Path }
}
