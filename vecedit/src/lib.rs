//! Modeling and mutation core of a 2D vector editor: affine geometry,
//! scene-graph nodes with cached bounds, path payloads and reversible commands.

pub mod geometry {
    pub mod affine;
    pub mod limits;
    pub mod resize;
    pub mod shapes;
    pub mod tolerance;
}
pub mod command;
pub mod error;
pub mod node;
pub mod scene;
pub mod settings;

pub use command::{Batch, Command, CommandStack, EditorEffect, EffectHandler};
pub use error::{EditError, Result};
pub use geometry::affine::Transform;
pub use geometry::resize::HandleKind;
pub use geometry::shapes::{Bounds, Point, Rect, TransformRect};
pub use node::path::{PathData, PathItem, Segment, SegmentPatch};
pub use node::{GraphNode, NodeData, NodeId, NodeKind, NodePatch};
pub use scene::{NodeStore, Scene};
pub use settings::Settings;
