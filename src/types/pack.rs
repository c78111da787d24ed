//! Overlay data pack types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::node::NodeId;

/// Identifier of an uploaded data pack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackId(String);

impl PackId {
    /// Wrap an existing pack identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (`dp_` + simple UUID v4).
    pub fn generate() -> Self {
        Self(format!("dp_{}", Uuid::new_v4().simple()))
    }

    /// Borrow the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of a tag file's `values` array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum TagValue {
    /// `"minecraft:stone"` or `"#minecraft:logs"`.
    Plain {
        /// Raw reference.
        id: String,
    },
    /// `{"id": "...", "required": false}`.
    Annotated {
        /// Raw reference.
        id: String,
        /// Whether the reference must resolve; absent means unspecified.
        required: Option<bool>,
    },
}

impl TagValue {
    /// Decode one `values` entry. Strings are plain references, objects
    /// must carry a string `id`; anything else is rejected.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(id) => Some(Self::Plain { id: id.clone() }),
            serde_json::Value::Object(map) => {
                let id = map.get("id")?.as_str()?.to_string();
                let required = map.get("required").and_then(|r| r.as_bool());
                Some(Self::Annotated { id, required })
            }
            _ => None,
        }
    }

    /// The raw reference string.
    pub fn raw_id(&self) -> &str {
        match self {
            Self::Plain { id } | Self::Annotated { id, .. } => id,
        }
    }

    /// Declared `required` flag, if any.
    pub fn required(&self) -> Option<bool> {
        match self {
            Self::Plain { .. } => None,
            Self::Annotated { required, .. } => *required,
        }
    }
}

/// A parsed tag file inside an overlay pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDefinition {
    /// Archive entry path.
    pub path: String,
    /// Owning namespace.
    pub namespace: String,
    /// Content domain.
    pub category: String,
    /// Tag name (may contain `/`).
    pub name: String,
    /// Whether this definition supersedes earlier outbound edges.
    pub replace: bool,
    /// Declared references, in file order.
    pub values: Vec<TagValue>,
    /// Raw JSON of the file.
    pub payload: serde_json::Value,
}

impl TagDefinition {
    /// Canonical id of the tag this file defines.
    pub fn id(&self) -> NodeId {
        crate::identifier::build_definition_id(&self.namespace, &self.category, &self.name)
    }
}

/// An uploaded overlay data pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPack {
    /// Generated identifier.
    pub id: PackId,
    /// Display name derived from the upload file name.
    pub name: String,
    /// Display colour.
    pub color: String,
    /// Whether the pack participates in merges.
    pub enabled: bool,
    /// Tag definitions by canonical id.
    pub tag_definitions: BTreeMap<NodeId, TagDefinition>,
    /// `pack.pack_format` from the pack metadata entry.
    pub pack_format: Option<u32>,
    /// Human-readable failure for error-state packs.
    pub error: Option<String>,
    /// When the pack was uploaded.
    pub uploaded_at: DateTime<Utc>,
    /// SHA-256 hex of the bytes this pack was decoded from.
    pub source_digest: String,
}

impl DataPack {
    /// True if the pack failed to load.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Number of tag definitions.
    pub fn num_definitions(&self) -> usize {
        self.tag_definitions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_value_discriminates_by_json_type() {
        assert_eq!(
            TagValue::from_json(&json!("minecraft:stone")),
            Some(TagValue::Plain { id: "minecraft:stone".to_string() })
        );
        assert_eq!(
            TagValue::from_json(&json!({ "id": "#c:ores", "required": false })),
            Some(TagValue::Annotated { id: "#c:ores".to_string(), required: Some(false) })
        );
        assert_eq!(
            TagValue::from_json(&json!({ "id": "minecraft:dirt" })).and_then(|v| v.required()),
            None
        );
    }

    #[test]
    fn test_tag_value_rejects_malformed_entries() {
        assert!(TagValue::from_json(&json!(42)).is_none());
        assert!(TagValue::from_json(&json!({ "required": true })).is_none());
        assert!(TagValue::from_json(&json!({ "id": 7 })).is_none());
    }

    #[test]
    fn test_generated_pack_ids_are_unique() {
        let a = PackId::generate();
        let b = PackId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("dp_"));
    }
}
