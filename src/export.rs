//! Graph export for presentation collaborators.
//!
//! The export is a flat element list (every node record, then every edge
//! record) plus summary data. Records serialize without a discriminator;
//! edge records are recognised by `sourceId`/`targetId`.

use serde::{Deserialize, Serialize};

use crate::graph::{GraphSnapshot, GraphStats};
use crate::types::{Attribution, Edge, Node, NodeId, NodeKind, ReplacedBy};
use crate::EXPORT_SCHEMA_VERSION;

/// Exported node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Canonical id.
    pub id: NodeId,
    /// Display label.
    pub label: String,
    /// Tag or element.
    pub kind: NodeKind,
    /// Content domain.
    pub category: String,
    /// Defining entry path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Defining file JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Owning overlay pack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Attribution>,
    /// Replacing overlay pack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<ReplacedBy>,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label().to_string(),
            kind: node.kind,
            category: node.category.clone(),
            path: node.definition_path.clone(),
            payload: node.payload.clone(),
            attribution: node.attribution.clone(),
            replaced_by: node.replaced_by.clone(),
        }
    }
}

/// Exported edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    /// Edge key, `source->target`.
    pub id: String,
    /// Declaring tag.
    pub source_id: NodeId,
    /// Referenced node.
    pub target_id: NodeId,
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.key().as_str().to_string(),
            source_id: edge.source_id.clone(),
            target_id: edge.target_id.clone(),
        }
    }
}

/// One entry of the flat element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphElement {
    /// Node record.
    Node(NodeRecord),
    /// Edge record.
    Edge(EdgeRecord),
}

/// Everything handed to presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphExport {
    /// Export schema version.
    pub schema_version: String,
    /// Nodes then edges.
    pub elements: Vec<GraphElement>,
    /// Tag/element counts.
    pub stats: GraphStats,
    /// Distinct categories, sorted.
    pub categories: Vec<String>,
    /// Content pack format.
    pub pack_format: Option<u32>,
}

impl GraphExport {
    /// Node records.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.elements.iter().filter_map(|e| match e {
            GraphElement::Node(n) => Some(n),
            GraphElement::Edge(_) => None,
        })
    }

    /// Edge records.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> {
        self.elements.iter().filter_map(|e| match e {
            GraphElement::Edge(edge) => Some(edge),
            GraphElement::Node(_) => None,
        })
    }
}

impl GraphSnapshot {
    /// Export for presentation.
    pub fn export(&self) -> GraphExport {
        let elements = self
            .nodes()
            .map(|n| GraphElement::Node(n.into()))
            .chain(self.edges().iter().map(|e| GraphElement::Edge(e.into())))
            .collect();

        GraphExport {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            elements,
            stats: self.stats(),
            categories: self.categories().into_iter().collect(),
            pack_format: self.pack_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn graph() -> GraphSnapshot {
        let mut graph = GraphSnapshot::new();
        let logs = NodeId::new("block:minecraft:logs");
        let oak = NodeId::new("block:minecraft:oak_log");
        graph.register_node(
            logs.clone(),
            NodeKind::Tag,
            "block",
            Some(("data/minecraft/tags/block/logs.json".into(), json!({"values": ["oak_log"]}))),
        );
        graph.ensure_node(&oak, NodeKind::Element, "block");
        graph.add_edge(&logs, &oak).unwrap();
        graph.set_pack_format(Some(61));
        graph
    }

    #[test]
    fn test_export_shape() {
        let export = graph().export();
        assert_eq!(export.elements.len(), 3);
        assert!(matches!(export.elements[2], GraphElement::Edge(_)));
        assert_eq!(export.categories, vec!["block".to_string()]);
        assert_eq!(export.pack_format, Some(61));

        let json = serde_json::to_value(&export).unwrap();
        let logs = &json["elements"][0];
        assert_eq!(logs["id"], "block:minecraft:logs");
        assert_eq!(logs["label"], "logs");
        assert_eq!(logs["kind"], "tag");
        assert_eq!(logs["path"], "data/minecraft/tags/block/logs.json");

        let edge = &json["elements"][2];
        assert_eq!(edge["id"], "block:minecraft:logs->block:minecraft:oak_log");
        assert_eq!(edge["sourceId"], "block:minecraft:logs");
        assert_eq!(edge["targetId"], "block:minecraft:oak_log");
    }

    #[test]
    fn test_export_json_reads_back() {
        let export = graph().export();
        let text = serde_json::to_string(&export).unwrap();
        let back: GraphExport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.nodes().count(), 2);
        assert_eq!(back.edges().count(), 1);
    }
}
