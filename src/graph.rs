//! Tag dependency graph.
//!
//! A `GraphSnapshot` holds nodes keyed by id and edges de-duplicated by
//! edge key. All mutation goes through the registration rules here:
//!
//! - a new id is inserted;
//! - an existing placeholder registered again with a definition is
//!   upgraded in place, never duplicated;
//! - an edge is only added when both endpoints exist and its key is new.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::canonical::canonical_hash_hex;
use crate::types::{Edge, EdgeKey, Node, NodeId, NodeKind};

/// Category value that is never recorded in the category set.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Error type for graph mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Edge endpoint is not a node in the graph.
    #[error("Edge endpoint not in graph: {0}")]
    MissingEndpoint(NodeId),
}

/// Tag/element counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of tag nodes.
    pub tags: usize,
    /// Number of element nodes.
    pub elements: usize,
}

/// Outcome of [`GraphSnapshot::register_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The id was new.
    Inserted,
    /// A placeholder received its definition.
    Upgraded,
    /// The node already existed and nothing changed.
    Unchanged,
}

/// A tag dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    nodes: BTreeMap<NodeId, Node>,
    edges: Vec<Edge>,
    edge_keys: BTreeSet<EdgeKey>,
    pack_format: Option<u32>,
}

impl GraphSnapshot {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node.
    ///
    /// With `definition = Some((path, payload))` the node is authoritative.
    /// An existing placeholder is upgraded in place; an existing
    /// authoritative node is left untouched.
    pub fn register_node(
        &mut self,
        id: NodeId,
        kind: NodeKind,
        category: &str,
        definition: Option<(String, serde_json::Value)>,
    ) -> Registration {
        match self.nodes.get_mut(&id) {
            None => {
                let node = match definition {
                    Some((path, payload)) => {
                        let mut node = Node::definition(id.clone(), category, path, payload);
                        node.kind = kind;
                        node
                    }
                    None => Node::placeholder(id.clone(), kind, category),
                };
                self.nodes.insert(id, node);
                Registration::Inserted
            }
            Some(existing) => match definition {
                Some((path, payload)) if existing.is_placeholder() => {
                    existing.definition_path = Some(path);
                    existing.payload = Some(payload);
                    existing.category = category.to_string();
                    existing.kind = kind;
                    Registration::Upgraded
                }
                _ => Registration::Unchanged,
            },
        }
    }

    /// Insert a placeholder for `id` unless a node already exists.
    ///
    /// Returns true if a node was created.
    pub fn ensure_node(&mut self, id: &NodeId, kind: NodeKind, category: &str) -> bool {
        self.register_node(id.clone(), kind, category, None) == Registration::Inserted
    }

    /// Add an edge. Returns `Ok(false)` if its key is already present.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId) -> Result<bool, GraphError> {
        for endpoint in [source, target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::MissingEndpoint(endpoint.clone()));
            }
        }
        let edge = Edge::new(source.clone(), target.clone());
        if !self.edge_keys.insert(edge.key()) {
            return Ok(false);
        }
        self.edges.push(edge);
        Ok(true)
    }

    /// Remove every edge whose source is `source`. Returns how many were removed.
    pub fn remove_outbound_edges(&mut self, source: &NodeId) -> usize {
        let before = self.edges.len();
        let edge_keys = &mut self.edge_keys;
        self.edges.retain(|edge| {
            if &edge.source_id == source {
                edge_keys.remove(&edge.key());
                false
            } else {
                true
            }
        });
        before - self.edges.len()
    }

    /// Get a node.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a node mutably.
    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// True if `id` is a node.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// True if the edge `source -> target` exists.
    pub fn contains_edge(&self, source: &NodeId, target: &NodeId) -> bool {
        self.edge_keys.contains(&EdgeKey::new(source, target))
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Tag/element counts.
    pub fn stats(&self) -> GraphStats {
        self.nodes.values().fold(GraphStats::default(), |mut stats, node| {
            match node.kind {
                NodeKind::Tag => stats.tags += 1,
                NodeKind::Element => stats.elements += 1,
            }
            stats
        })
    }

    /// Distinct categories observed, sorted.
    pub fn categories(&self) -> BTreeSet<String> {
        self.nodes
            .values()
            .filter(|n| !n.category.is_empty() && n.category != UNKNOWN_CATEGORY)
            .map(|n| n.category.clone())
            .collect()
    }

    /// Pack format of the content version this graph was built from.
    pub fn pack_format(&self) -> Option<u32> {
        self.pack_format
    }

    /// Set the content pack format.
    pub fn set_pack_format(&mut self, pack_format: Option<u32>) {
        self.pack_format = pack_format;
    }

    /// Outbound edges of `id`.
    pub fn outbound_edges<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.source_id == id)
    }

    /// Inbound edges of `id`.
    pub fn inbound_edges<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.target_id == id)
    }

    /// Targets referenced by `id`, sorted.
    pub fn children(&self, id: &NodeId) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = self.outbound_edges(id).map(|e| e.target_id.clone()).collect();
        children.sort();
        children
    }

    /// Tags referencing `id`, sorted.
    pub fn parents(&self, id: &NodeId) -> Vec<NodeId> {
        let mut parents: Vec<NodeId> = self.inbound_edges(id).map(|e| e.source_id.clone()).collect();
        parents.sort();
        parents
    }

    /// Check that every edge endpoint exists and edge keys match the edge list.
    pub fn validate(&self) -> Result<(), GraphError> {
        for edge in &self.edges {
            for endpoint in [&edge.source_id, &edge.target_id] {
                if !self.nodes.contains_key(endpoint) {
                    return Err(GraphError::MissingEndpoint(endpoint.clone()));
                }
            }
        }
        debug_assert_eq!(self.edges.len(), self.edge_keys.len());
        Ok(())
    }

    /// Order-independent structural fingerprint (xxh64 hex).
    pub fn fingerprint(&self) -> String {
        let mut edges: Vec<&Edge> = self.edges.iter().collect();
        edges.sort();
        let input = FingerprintInput {
            nodes: self.nodes.values().collect(),
            edges,
            pack_format: self.pack_format,
        };
        canonical_hash_hex(&input)
    }
}

/// Internal struct for computing the fingerprint.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    nodes: Vec<&'a Node>,
    edges: Vec<&'a Edge>,
    pack_format: Option<u32>,
}
