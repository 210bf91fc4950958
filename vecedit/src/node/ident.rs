use super::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hands out node ids and per-kind display names ("Rect 1", "Rect 2", ...).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next_id: u64,
    counters: HashMap<NodeKind, u32>,
}

impl IdAllocator {
    pub fn new() -> Self { Self::default() }

    pub fn next_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        NodeId(id)
    }

    /// Record an externally supplied id so generated ids never collide with it.
    pub fn reserve(&mut self, id: NodeId) {
        if id.0 >= self.next_id {
            self.next_id = id.0 + 1;
        }
    }

    pub fn next_name(&mut self, kind: NodeKind) -> String {
        let n = self.counters.entry(kind).or_insert(0);
        *n += 1;
        format!("{} {}", kind.label(), n)
    }

    /// Bump the per-kind counter past an imported name of the form "<Kind> <n>".
    pub fn observe_name(&mut self, kind: NodeKind, name: &str) {
        let suffix = name
            .strip_prefix(kind.label())
            .and_then(|rest| rest.strip_prefix(' '))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(n) = suffix {
            let c = self.counters.entry(kind).or_insert(0);
            *c = (*c).max(n);
        }
    }
}
