//! Identifier scheme: canonical node ids and tag entry paths.
//!
//! Every node is named `category:namespace:name`. Raw references inside
//! tag files omit the category (it is always the declaring tag's
//! category) and may omit the namespace, which then defaults to
//! [`DEFAULT_NAMESPACE`].
//!
//! ## Entry Path Patterns
//!
//! | Pattern | Shape | Category |
//! |---------|-------|----------|
//! | [`TagPathPattern::Base`] | `data/<ns>/tags/<category-path>/<name>.json` | every directory between `tags/` and the file |
//! | [`TagPathPattern::Overlay`] | `data/<ns>/tags/<category>/<name>.json` | exactly one segment; `<name>` keeps any further `/` |
//!
//! The two patterns disagree for nested directories, e.g.
//! `data/minecraft/tags/worldgen/biome/is_ocean.json` is category
//! `worldgen/biome` in the base graph but category `worldgen`, name
//! `biome/is_ocean` in an overlay.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::types::{NodeId, NodeKind};
use crate::{DEFAULT_NAMESPACE, TAG_REFERENCE_MARKER};

/// Build the id of a tag defined at `namespace`/`category`/`name`.
pub fn build_definition_id(namespace: &str, category: &str, name: &str) -> NodeId {
    NodeId::new(format!("{}:{}:{}", category, namespace, name))
}

/// Resolve a raw tag-file reference within the declaring tag's category.
///
/// `#ns:name` is a tag reference, anything else an element. A missing
/// namespace defaults to [`DEFAULT_NAMESPACE`]. Total: never fails.
pub fn resolve_reference(raw: &str, declaring_category: &str) -> (NodeId, NodeKind) {
    let (body, kind) = match raw.strip_prefix(TAG_REFERENCE_MARKER) {
        Some(stripped) => (stripped, NodeKind::Tag),
        None => (raw, NodeKind::Element),
    };
    let qualified = if body.contains(':') {
        body.to_string()
    } else {
        format!("{}:{}", DEFAULT_NAMESPACE, body)
    };
    (NodeId::new(format!("{}:{}", declaring_category, qualified)), kind)
}

/// Which entry layout to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPathPattern {
    /// Base content archives: multi-segment category path.
    Base,
    /// Overlay packs: single-segment category.
    Overlay,
}

/// Components of a matched tag entry path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPath {
    /// Owning namespace.
    pub namespace: String,
    /// Content domain.
    pub category: String,
    /// Tag name without the `.json` suffix.
    pub name: String,
}

impl TagPath {
    /// Canonical id of the tag defined at this path.
    pub fn definition_id(&self) -> NodeId {
        build_definition_id(&self.namespace, &self.category, &self.name)
    }
}

fn base_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^data/([^/]+)/tags/(.+)/([^/]+)\.json$").expect("static base tag pattern")
    })
}

fn overlay_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^data/([^/]+)/tags/([^/]+)/(.+)\.json$").expect("static overlay tag pattern")
    })
}

impl TagPathPattern {
    /// Match an archive entry path, returning its components.
    pub fn parse(&self, path: &str) -> Option<TagPath> {
        let re = match self {
            Self::Base => base_regex(),
            Self::Overlay => overlay_regex(),
        };
        let caps = re.captures(path)?;
        Some(TagPath {
            namespace: caps.get(1)?.as_str().to_string(),
            category: caps.get(2)?.as_str().to_string(),
            name: caps.get(3)?.as_str().to_string(),
        })
    }

    /// True if `path` is a tag entry under this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.parse(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_tag_reference() {
        let (id, kind) = resolve_reference("#minecraft:stripped_logs", "block");
        assert_eq!(id.as_str(), "block:minecraft:stripped_logs");
        assert_eq!(kind, NodeKind::Tag);
    }

    #[test]
    fn test_resolve_defaults_namespace() {
        let (id, kind) = resolve_reference("oak_log", "block");
        assert_eq!(id.as_str(), "block:minecraft:oak_log");
        assert_eq!(kind, NodeKind::Element);

        let (id, kind) = resolve_reference("#dirt", "item");
        assert_eq!(id.as_str(), "item:minecraft:dirt");
        assert_eq!(kind, NodeKind::Tag);
    }

    #[test]
    fn test_resolve_keeps_foreign_namespace() {
        let (id, _) = resolve_reference("#c:ores", "block");
        assert_eq!(id.as_str(), "block:c:ores");
    }

    #[test]
    fn test_resolve_is_total_on_odd_input() {
        let (id, kind) = resolve_reference("", "block");
        assert_eq!(id.as_str(), "block:minecraft:");
        assert_eq!(kind, NodeKind::Element);

        let (id, kind) = resolve_reference("#", "block");
        assert_eq!(id.as_str(), "block:minecraft:");
        assert_eq!(kind, NodeKind::Tag);
    }

    #[test]
    fn test_build_definition_id() {
        assert_eq!(
            build_definition_id("minecraft", "block", "logs").as_str(),
            "block:minecraft:logs"
        );
    }

    #[test]
    fn test_base_pattern_allows_nested_category() {
        let path = TagPathPattern::Base
            .parse("data/minecraft/tags/worldgen/biome/is_ocean.json")
            .unwrap();
        assert_eq!(path.namespace, "minecraft");
        assert_eq!(path.category, "worldgen/biome");
        assert_eq!(path.name, "is_ocean");
        assert_eq!(path.definition_id().as_str(), "worldgen/biome:minecraft:is_ocean");
    }

    #[test]
    fn test_overlay_pattern_uses_single_segment_category() {
        let path = TagPathPattern::Overlay
            .parse("data/minecraft/tags/worldgen/biome/is_ocean.json")
            .unwrap();
        assert_eq!(path.category, "worldgen");
        assert_eq!(path.name, "biome/is_ocean");
    }

    #[test]
    fn test_patterns_agree_on_flat_layout() {
        let path = "data/minecraft/tags/block/logs.json";
        assert_eq!(TagPathPattern::Base.parse(path), TagPathPattern::Overlay.parse(path));
    }

    #[test]
    fn test_non_tag_entries_rejected() {
        for path in [
            "data/minecraft/recipes/stick.json",
            "data/minecraft/tags/block/logs.txt",
            "data/minecraft/tags/logs.json",
            "assets/minecraft/tags/block/logs.json",
            "pack.mcmeta",
        ] {
            assert!(!TagPathPattern::Base.matches(path), "{path}");
            assert!(!TagPathPattern::Overlay.matches(path), "{path}");
        }
    }
}
