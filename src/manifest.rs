//! Version manifest and version descriptor documents.
//!
//! Fetching these documents is the host's job; this module only decodes
//! them and picks versions the way the viewer presents them.

use serde::{Deserialize, Serialize};

/// Upstream location of the version manifest.
pub const MANIFEST_URL: &str = "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

/// Oldest version listed: the first with data-driven tags.
pub const OLDEST_SUPPORTED_VERSION: &str = "1.13";

/// Release channel of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    /// Stable release.
    Release,
    /// Development snapshot.
    Snapshot,
    /// Legacy beta.
    OldBeta,
    /// Legacy alpha.
    OldAlpha,
    /// Anything newer than this decoder knows about.
    #[serde(other)]
    Other,
}

/// One version in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Version id, e.g. `1.21.4`.
    pub id: String,
    /// Release channel.
    #[serde(rename = "type")]
    pub kind: VersionKind,
    /// Location of the version descriptor.
    pub url: String,
}

/// Latest release and snapshot ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestVersions {
    /// Latest release id.
    #[serde(default)]
    pub release: String,
    /// Latest snapshot id.
    #[serde(default)]
    pub snapshot: String,
}

/// Which versions to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionFilter {
    /// Every channel.
    #[default]
    All,
    /// Releases only.
    Release,
    /// Snapshots only.
    Snapshot,
}

impl VersionFilter {
    fn accepts(&self, kind: VersionKind) -> bool {
        match self {
            Self::All => true,
            Self::Release => kind == VersionKind::Release,
            Self::Snapshot => kind == VersionKind::Snapshot,
        }
    }
}

/// The version manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionManifest {
    /// Latest ids.
    #[serde(default)]
    pub latest: LatestVersions,
    /// Versions, newest first.
    pub versions: Vec<VersionEntry>,
}

impl VersionManifest {
    /// Decode a manifest.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Versions matching `filter`, newest first, stopping at
    /// [`OLDEST_SUPPORTED_VERSION`] (included when it matches).
    pub fn selectable_versions(&self, filter: VersionFilter) -> Vec<&VersionEntry> {
        let mut selected = Vec::new();
        for version in &self.versions {
            let matches = filter.accepts(version.kind);
            if version.id == OLDEST_SUPPORTED_VERSION {
                if matches {
                    selected.push(version);
                }
                break;
            }
            if matches {
                selected.push(version);
            }
        }
        selected
    }

    /// Version loaded on startup: newest snapshot, else newest release.
    pub fn default_version(&self) -> Option<&VersionEntry> {
        self.versions
            .iter()
            .find(|v| v.kind == VersionKind::Snapshot)
            .or_else(|| self.versions.iter().find(|v| v.kind == VersionKind::Release))
    }
}

/// A downloadable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    /// Artifact location.
    pub url: String,
    /// Expected size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

/// Artifacts of a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downloads {
    /// Client archive (holds the base tag files).
    #[serde(default)]
    pub client: Option<Download>,
}

/// The per-version descriptor document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDetail {
    /// Version id.
    #[serde(default)]
    pub id: String,
    /// Artifacts.
    #[serde(default)]
    pub downloads: Downloads,
}

impl VersionDetail {
    /// Decode a version descriptor.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Location of the client archive.
    pub fn client_url(&self) -> Option<&str> {
        self.downloads.client.as_ref().map(|d| d.url.as_str())
    }
}

/// Read the data pack format from a content archive's `version.json`.
///
/// `pack_version` is a number in older versions and an object carrying
/// `data` (or `data_major` in some snapshots) in newer ones.
pub fn pack_format_from_version_json(json: &serde_json::Value) -> Option<u32> {
    let pack_version = json.get("pack_version")?;
    let format = match pack_version {
        serde_json::Value::Object(map) => map.get("data").or_else(|| map.get("data_major"))?,
        other => other,
    };
    format.as_u64().and_then(|n| u32::try_from(n).ok())
}

/// Read `pack.pack_format` from a data pack's metadata document.
pub fn pack_format_from_metadata(json: &serde_json::Value) -> Option<u32> {
    json.get("pack")?
        .get("pack_format")?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> VersionManifest {
        VersionManifest::from_json(
            br#"{
                "latest": {"release": "1.21.4", "snapshot": "25w02a"},
                "versions": [
                    {"id": "25w02a", "type": "snapshot", "url": "u1"},
                    {"id": "1.21.4", "type": "release", "url": "u2"},
                    {"id": "18w01a", "type": "snapshot", "url": "u3"},
                    {"id": "1.13", "type": "release", "url": "u4"},
                    {"id": "1.12.2", "type": "release", "url": "u5"},
                    {"id": "b1.7.3", "type": "old_beta", "url": "u6"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_selectable_versions_stop_at_oldest_supported() {
        let m = manifest();
        let all: Vec<&str> = m.selectable_versions(VersionFilter::All).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(all, vec!["25w02a", "1.21.4", "18w01a", "1.13"]);

        let releases: Vec<&str> = m
            .selectable_versions(VersionFilter::Release)
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(releases, vec!["1.21.4", "1.13"]);

        let snapshots: Vec<&str> = m
            .selectable_versions(VersionFilter::Snapshot)
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(snapshots, vec!["25w02a", "18w01a"]);
    }

    #[test]
    fn test_default_version_prefers_snapshot() {
        assert_eq!(manifest().default_version().unwrap().id, "25w02a");

        let releases_only = VersionManifest {
            latest: LatestVersions::default(),
            versions: vec![VersionEntry {
                id: "1.20".into(),
                kind: VersionKind::Release,
                url: "u".into(),
            }],
        };
        assert_eq!(releases_only.default_version().unwrap().id, "1.20");
        assert!(VersionManifest::default().default_version().is_none());
    }

    #[test]
    fn test_unknown_version_kind() {
        let m = VersionManifest::from_json(br#"{"versions":[{"id":"x","type":"experiment","url":"u"}]}"#)
            .unwrap();
        assert_eq!(m.versions[0].kind, VersionKind::Other);
    }

    #[test]
    fn test_client_url() {
        let detail = VersionDetail::from_json(
            br#"{"id":"1.21.4","downloads":{"client":{"url":"https://x/client.jar","size":10}}}"#,
        )
        .unwrap();
        assert_eq!(detail.client_url(), Some("https://x/client.jar"));
        assert_eq!(VersionDetail::default().client_url(), None);
    }

    #[test]
    fn test_pack_format_from_version_json() {
        assert_eq!(pack_format_from_version_json(&json!({"pack_version": 15})), Some(15));
        assert_eq!(
            pack_format_from_version_json(&json!({"pack_version": {"resource": 46, "data": 61}})),
            Some(61)
        );
        assert_eq!(
            pack_format_from_version_json(&json!({"pack_version": {"data_major": 88}})),
            Some(88)
        );
        assert_eq!(pack_format_from_version_json(&json!({"pack_version": "x"})), None);
        assert_eq!(pack_format_from_version_json(&json!({})), None);
    }

    #[test]
    fn test_pack_format_from_metadata() {
        assert_eq!(pack_format_from_metadata(&json!({"pack": {"pack_format": 48}})), Some(48));
        assert_eq!(pack_format_from_metadata(&json!({"pack": {}})), None);
        assert_eq!(pack_format_from_metadata(&json!({"pack": {"pack_format": -1}})), None);
    }
}
