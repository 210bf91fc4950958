//! Flat interchange record for a node. `to_record`/`from_record` round-trip exactly.

use super::ident::IdAllocator;
use super::path::PathData;
use super::{GraphNode, NodeAttrs, NodeData, NodeId, NodeKind, Paint};
use crate::error::{EditError, Result};
use crate::geometry::affine::Transform;
use crate::geometry::limits;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_true() -> bool { true }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub lock: bool,
    pub width: f64,
    pub height: f64,
    pub transform: Transform,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default)]
    pub fill: Vec<Paint>,
    #[serde(default)]
    pub stroke: Vec<Paint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_data: Option<PathData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphNode {
    pub fn to_record(&self) -> NodeRecord {
        let a = &self.attrs;
        let (corner_radius, path_data) = match &self.data {
            NodeData::Rect { corner_radius } => (*corner_radius, None),
            NodeData::Path(pd) => (None, Some(pd.clone())),
            NodeData::Ellipse | NodeData::Line => (None, None),
        };
        NodeRecord {
            id: self.id,
            kind: self.kind(),
            name: self.name.clone(),
            visible: a.visible,
            lock: a.lock,
            width: a.width,
            height: a.height,
            transform: a.transform,
            stroke_width: a.stroke_width,
            fill: a.fill.clone(),
            stroke: a.stroke.clone(),
            corner_radius,
            path_data,
            extra: a.extra.clone(),
        }
    }

    /// Rebuild a node from its record. Stored geometry is taken as-is so
    /// export after import is identical.
    pub fn from_record(rec: NodeRecord, ids: &mut IdAllocator) -> Result<GraphNode> {
        if rec.id.0 > limits::MAX_NODE_ID {
            return Err(EditError::Limit(format!("node id {} above {}", rec.id, limits::MAX_NODE_ID)));
        }
        let coords = [rec.width, rec.height, rec.transform.tx, rec.transform.ty];
        if !coords.iter().all(|v| limits::in_coord_bounds(*v)) {
            return Err(EditError::Limit(format!("node {} geometry out of bounds", rec.id)));
        }
        let data = match rec.kind {
            NodeKind::Rect => NodeData::Rect { corner_radius: rec.corner_radius },
            NodeKind::Ellipse => NodeData::Ellipse,
            NodeKind::Line => NodeData::Line,
            NodeKind::Path => {
                let pd = rec.path_data.unwrap_or_default();
                if pd.items.len() > limits::MAX_PATH_ITEMS
                    || pd.items.iter().any(|it| it.segs.len() > limits::MAX_SEGMENTS_PER_ITEM)
                {
                    return Err(EditError::Limit(format!("node {} path too large", rec.id)));
                }
                NodeData::Path(pd)
            }
        };
        ids.reserve(rec.id);
        ids.observe_name(rec.kind, &rec.name);
        let attrs = NodeAttrs {
            width: rec.width,
            height: rec.height,
            transform: rec.transform,
            stroke_width: rec.stroke_width,
            visible: rec.visible,
            lock: rec.lock,
            fill: rec.fill,
            stroke: rec.stroke,
            extra: rec.extra,
        };
        Ok(GraphNode::from_parts(rec.id, rec.name, attrs, data))
    }

    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self.to_record()).unwrap_or(Value::Null)
    }

    pub fn from_json_value(v: Value, ids: &mut IdAllocator) -> Result<GraphNode> {
        let rec: NodeRecord = serde_json::from_value(v)?;
        GraphNode::from_record(rec, ids)
    }
}
