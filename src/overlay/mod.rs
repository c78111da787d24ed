//! Overlay data packs.
//!
//! Uploaded packs are decoded into [`TagDefinition`]s and kept in an
//! [`OverlayStore`] in upload order. Failures never escape an upload:
//! they become error-state packs.

pub mod store;

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::archive::{Archive, ArchiveError};
use crate::identifier::TagPathPattern;
use crate::manifest::pack_format_from_metadata;
use crate::tag_file::TagFile;
use crate::types::{NodeId, TagDefinition};

pub use store::{OverlayStore, UploadOutcome};

/// Error type for overlay loading.
///
/// Never returned from [`OverlayStore::upload`]; converted into the
/// `error` message of an error-state pack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverlayError {
    /// Upload bytes could not be opened.
    #[error("{0}")]
    Archive(#[from] ArchiveError),
    /// Archive holds no usable tag files.
    #[error("No valid tag definitions found in data pack")]
    NoDefinitionsFound,
    /// Archive holds nested packs but none of them loaded.
    #[error("No data packs found")]
    NoNestedPacks,
}

/// Compatibility-relevant metadata of a pack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackMetadata {
    /// `pack.pack_format`; `None` when the metadata entry is missing or invalid.
    pub pack_format: Option<u32>,
}

/// Decode every overlay tag file in `archive`.
///
/// Unreadable entries are logged and skipped.
pub async fn extract_tag_definitions(archive: &dyn Archive) -> BTreeMap<NodeId, TagDefinition> {
    let mut definitions = BTreeMap::new();

    for path in archive.entries() {
        let Some(tag_path) = TagPathPattern::Overlay.parse(&path) else {
            continue;
        };

        let file = match archive.read_entry(&path).await {
            Ok(bytes) => TagFile::parse(&bytes).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        let file = match file {
            Ok(file) => file,
            Err(reason) => {
                warn!(path = %path, reason = %reason, "Failed to parse overlay tag");
                continue;
            }
        };

        let definition = TagDefinition {
            path: path.clone(),
            namespace: tag_path.namespace,
            category: tag_path.category,
            name: tag_path.name,
            replace: file.replace,
            values: file.values,
            payload: file.payload,
        };
        definitions.insert(definition.id(), definition);
    }

    definitions
}

/// Read the pack format from the metadata entry, if present and valid.
pub async fn read_pack_metadata(archive: &dyn Archive, metadata_entry: &str) -> PackMetadata {
    let bytes = match archive.read_entry(metadata_entry).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Pack has no metadata entry");
            return PackMetadata::default();
        }
    };
    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(json) => PackMetadata {
            pack_format: pack_format_from_metadata(&json),
        },
        Err(e) => {
            warn!(error = %e, "Could not read pack metadata");
            PackMetadata::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::InMemoryArchive;

    #[tokio::test]
    async fn test_extract_definitions() {
        let archive = InMemoryArchive::from_entries([
            (
                "data/minecraft/tags/block/stripped_logs.json",
                br#"{"replace": true, "values": ["minecraft:stripped_oak_log"]}"#.to_vec(),
            ),
            ("data/minecraft/tags/block/bad.json", b"oops".to_vec()),
            ("data/minecraft/functions/tick.mcfunction", b"say hi".to_vec()),
        ]);

        let defs = extract_tag_definitions(&archive).await;
        assert_eq!(defs.len(), 1);

        let def = &defs[&NodeId::new("block:minecraft:stripped_logs")];
        assert!(def.replace);
        assert_eq!(def.values.len(), 1);
        assert_eq!(def.category, "block");
        assert_eq!(def.path, "data/minecraft/tags/block/stripped_logs.json");
    }

    #[tokio::test]
    async fn test_overlay_keeps_nested_directories_in_name() {
        let archive = InMemoryArchive::from_entries([(
            "data/minecraft/tags/block/mineable/pickaxe.json",
            br#"{"values": []}"#.to_vec(),
        )]);
        let defs = extract_tag_definitions(&archive).await;
        assert!(defs.contains_key(&NodeId::new("block:minecraft:mineable/pickaxe")));
    }

    #[tokio::test]
    async fn test_pack_metadata() {
        let with = InMemoryArchive::from_entries([("pack.mcmeta", br#"{"pack": {"pack_format": 48}}"#.to_vec())]);
        assert_eq!(read_pack_metadata(&with, "pack.mcmeta").await.pack_format, Some(48));

        let invalid = InMemoryArchive::from_entries([("pack.mcmeta", b"{".to_vec())]);
        assert_eq!(read_pack_metadata(&invalid, "pack.mcmeta").await.pack_format, None);

        let without = InMemoryArchive::new();
        assert_eq!(read_pack_metadata(&without, "pack.mcmeta").await, PackMetadata::default());
    }
}
