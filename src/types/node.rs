//! Node types for the tag graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identifier of a node: `category:namespace:name`.
///
/// Implements `Ord` so graphs iterate nodes in a deterministic order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an already canonical identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display label: the last `:`-separated segment.
    pub fn label(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a node is a grouping tag or a concrete element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Named grouping that references other tags and elements.
    Tag,
    /// Concrete leaf entity.
    Element,
}

impl NodeKind {
    /// Parse a node kind from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tag" => Some(Self::Tag),
            "element" => Some(Self::Element),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::Element => write!(f, "element"),
        }
    }
}

/// The overlay pack a node was introduced or last claimed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    /// Owning pack.
    pub pack_id: super::PackId,
    /// Pack colour at merge time.
    pub pack_color: String,
}

/// Marks a tag whose outbound edges were superseded by a replacing overlay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacedBy {
    /// Name of the replacing pack.
    pub pack_name: String,
    /// Pack colour at merge time.
    pub pack_color: String,
}

/// A node in the tag graph.
///
/// A node without `definition_path` is a placeholder: it exists only
/// because something referenced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Canonical identifier.
    pub id: NodeId,
    /// Tag or element.
    pub kind: NodeKind,
    /// Content domain, e.g. `block`.
    pub category: String,
    /// Archive path of the defining tag file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_path: Option<String>,
    /// Raw JSON of the defining tag file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Overlay pack that introduced or claimed this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Attribution>,
    /// Set when a replacing overlay superseded this tag's outbound edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<ReplacedBy>,
}

impl Node {
    /// Create a placeholder node.
    pub fn placeholder(id: NodeId, kind: NodeKind, category: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            category: category.into(),
            definition_path: None,
            payload: None,
            attribution: None,
            replaced_by: None,
        }
    }

    /// Create an authoritative tag node from its definition file.
    pub fn definition(
        id: NodeId,
        category: impl Into<String>,
        definition_path: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id,
            kind: NodeKind::Tag,
            category: category.into(),
            definition_path: Some(definition_path.into()),
            payload: Some(payload),
            attribution: None,
            replaced_by: None,
        }
    }

    /// True if no definition has been parsed for this node.
    pub fn is_placeholder(&self) -> bool {
        self.definition_path.is_none()
    }

    /// Display label.
    pub fn label(&self) -> &str {
        self.id.label()
    }
}
