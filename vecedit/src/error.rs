use crate::node::NodeId;

/// Result type used across the editor core.
pub type Result<T> = std::result::Result<T, EditError>;

/// Failures that indicate a wiring bug or malformed input. Probing for state
/// that may not exist (a path index, a segment) returns `Option`/`bool` instead.
#[derive(thiserror::Error, Debug)]
pub enum EditError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("unknown control handle '{0}'")]
    UnknownHandle(String),

    #[error("handle '{handle}' is not supported on a {kind}")]
    UnsupportedHandle { handle: String, kind: String },

    #[error("node {id} is not a {expected}")]
    KindMismatch { id: NodeId, expected: String },

    #[error("document exceeds limit: {0}")]
    Limit(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
