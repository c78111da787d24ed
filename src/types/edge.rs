//! Edge types for the tag graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::node::NodeId;

/// Identity key of an edge: `source->target`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeKey(String);

impl EdgeKey {
    /// Build the key for a `(source, target)` pair.
    pub fn new(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("{}->{}", source, target))
    }

    /// Borrow the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directed edge from a declaring tag to a referenced tag or element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Declaring tag.
    pub source_id: NodeId,
    /// Referenced tag or element.
    pub target_id: NodeId,
}

impl Edge {
    /// Create a new edge.
    pub fn new(source_id: NodeId, target_id: NodeId) -> Self {
        Self { source_id, target_id }
    }

    /// Identity key of this edge.
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(&self.source_id, &self.target_id)
    }
}

// Canonical ordering: source, then target
impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.source_id
            .cmp(&other.source_id)
            .then_with(|| self.target_id.cmp(&other.target_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_key_format() {
        let edge = Edge::new(
            NodeId::new("block:minecraft:logs"),
            NodeId::new("block:minecraft:oak_log"),
        );
        assert_eq!(edge.key().as_str(), "block:minecraft:logs->block:minecraft:oak_log");
    }

    #[test]
    fn test_edge_ordering() {
        let a = NodeId::new("block:minecraft:a");
        let b = NodeId::new("block:minecraft:b");
        let c = NodeId::new("block:minecraft:c");

        let e1 = Edge::new(a.clone(), b.clone());
        let e2 = Edge::new(a, c.clone());
        let e3 = Edge::new(b, c);

        // Same source, different target
        assert!(e1 < e2);
        // Different source
        assert!(e2 < e3);
    }
}
