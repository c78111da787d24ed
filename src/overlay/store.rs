//! Overlay pack store.

use std::collections::BTreeMap;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::archive::{Archive, ArchiveOpener, ZipOpener};
use crate::config::{GraphConfig, DEFAULT_PALETTE};
use crate::types::{DataPack, NodeId, PackId, TagDefinition};

use super::{extract_tag_definitions, read_pack_metadata, OverlayError};

/// Packs produced by one upload.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// A plain pack, or the error-state pack recording a failed upload.
    Single(DataPack),
    /// One pack per nested archive that loaded.
    Nested(Vec<DataPack>),
}

impl UploadOutcome {
    /// All packs produced.
    pub fn packs(&self) -> &[DataPack] {
        match self {
            Self::Single(pack) => std::slice::from_ref(pack),
            Self::Nested(packs) => packs,
        }
    }

    /// True if the upload produced an error-state pack.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Single(pack) if pack.is_error())
    }
}

/// Contents decoded from one pack archive.
struct LoadedPack {
    definitions: BTreeMap<NodeId, TagDefinition>,
    pack_format: Option<u32>,
}

/// Uploaded overlay packs, in upload order.
pub struct OverlayStore<O: ArchiveOpener = ZipOpener> {
    opener: O,
    packs: Vec<DataPack>,
    color_index: usize,
    palette: Vec<String>,
    metadata_entry: String,
}

impl Default for OverlayStore<ZipOpener> {
    fn default() -> Self {
        Self::new(ZipOpener, &GraphConfig::default())
    }
}

impl<O: ArchiveOpener> OverlayStore<O> {
    /// Create an empty store.
    ///
    /// An empty configured palette falls back to [`DEFAULT_PALETTE`].
    pub fn new(opener: O, config: &GraphConfig) -> Self {
        let palette = if config.palette.is_empty() {
            warn!("Empty pack palette configured, using default palette");
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            config.palette.clone()
        };
        Self {
            opener,
            packs: Vec::new(),
            color_index: 0,
            palette,
            metadata_entry: config.metadata_entry.clone(),
        }
    }

    /// Upload an archive.
    ///
    /// Nested `.zip` entries (one level) become independent packs and the
    /// wrapper's own tag files are ignored. Failures are captured into a
    /// disabled error-state pack; this never fails.
    pub async fn upload(&mut self, bytes: Vec<u8>, file_name: &str) -> UploadOutcome {
        let name = strip_zip_suffix(file_name).to_string();
        let digest = digest_hex(&bytes);

        match self.try_upload(bytes, &name, &digest).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(file = %file_name, error = %e, "Data pack upload failed");
                let pack = DataPack {
                    id: PackId::generate(),
                    name,
                    color: self.next_color(),
                    enabled: false,
                    tag_definitions: BTreeMap::new(),
                    pack_format: None,
                    error: Some(e.to_string()),
                    uploaded_at: Utc::now(),
                    source_digest: digest,
                };
                self.packs.push(pack.clone());
                UploadOutcome::Single(pack)
            }
        }
    }

    async fn try_upload(
        &mut self,
        bytes: Vec<u8>,
        name: &str,
        digest: &str,
    ) -> Result<UploadOutcome, OverlayError> {
        let archive = self.opener.open(bytes)?;

        let nested: Vec<String> = archive
            .entries()
            .into_iter()
            .filter(|path| path.ends_with(".zip"))
            .collect();

        if nested.is_empty() {
            let loaded = self.load(archive.as_ref()).await;
            if loaded.definitions.is_empty() {
                return Err(OverlayError::NoDefinitionsFound);
            }
            let pack = self.register(name.to_string(), digest.to_string(), loaded);
            return Ok(UploadOutcome::Single(pack));
        }

        info!(count = nested.len(), "Found nested data packs");
        let mut packs = Vec::new();
        for path in nested {
            match self.load_nested(archive.as_ref(), &path).await {
                Ok(Some(pack)) => packs.push(pack),
                Ok(None) => debug!(path = %path, "Nested pack has no tag definitions"),
                Err(e) => warn!(path = %path, error = %e, "Failed to process nested pack"),
            }
        }

        if packs.is_empty() {
            return Err(OverlayError::NoNestedPacks);
        }
        Ok(UploadOutcome::Nested(packs))
    }

    async fn load_nested(
        &mut self,
        outer: &dyn Archive,
        path: &str,
    ) -> Result<Option<DataPack>, OverlayError> {
        let bytes = outer.read_entry(path).await?;
        let digest = digest_hex(&bytes);
        let inner = self.opener.open(bytes)?;

        let loaded = self.load(inner.as_ref()).await;
        if loaded.definitions.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.register(nested_pack_name(path), digest, loaded)))
    }

    async fn load(&self, archive: &dyn Archive) -> LoadedPack {
        let definitions = extract_tag_definitions(archive).await;
        let metadata = read_pack_metadata(archive, &self.metadata_entry).await;
        LoadedPack {
            definitions,
            pack_format: metadata.pack_format,
        }
    }

    fn register(&mut self, name: String, digest: String, loaded: LoadedPack) -> DataPack {
        let pack = DataPack {
            id: PackId::generate(),
            name,
            color: self.next_color(),
            enabled: true,
            tag_definitions: loaded.definitions,
            pack_format: loaded.pack_format,
            error: None,
            uploaded_at: Utc::now(),
            source_digest: digest,
        };
        info!(
            pack = %pack.id,
            name = %pack.name,
            definitions = pack.num_definitions(),
            pack_format = ?pack.pack_format,
            "Data pack loaded"
        );
        self.packs.push(pack.clone());
        pack
    }

    fn next_color(&mut self) -> String {
        let color = self.palette[self.color_index % self.palette.len()].clone();
        self.color_index += 1;
        color
    }

    /// Flip a pack's enabled flag. Returns the new state, or `None` if unknown.
    pub fn toggle(&mut self, id: &PackId) -> Option<bool> {
        let pack = self.packs.iter_mut().find(|p| &p.id == id)?;
        pack.enabled = !pack.enabled;
        Some(pack.enabled)
    }

    /// Remove a pack. Returns false if unknown.
    pub fn remove(&mut self, id: &PackId) -> bool {
        let before = self.packs.len();
        self.packs.retain(|p| &p.id != id);
        self.packs.len() != before
    }

    /// Change a pack's colour. Returns false if unknown.
    pub fn recolor(&mut self, id: &PackId, color: impl Into<String>) -> bool {
        match self.packs.iter_mut().find(|p| &p.id == id) {
            Some(pack) => {
                pack.color = color.into();
                true
            }
            None => false,
        }
    }

    /// Get a pack.
    pub fn get(&self, id: &PackId) -> Option<&DataPack> {
        self.packs.iter().find(|p| &p.id == id)
    }

    /// Colour assigned to a pack.
    pub fn assigned_color(&self, id: &PackId) -> Option<&str> {
        self.get(id).map(|p| p.color.as_str())
    }

    /// All packs, in upload order.
    pub fn list_all(&self) -> &[DataPack] {
        &self.packs
    }

    /// Enabled packs, in upload order.
    pub fn list_enabled(&self) -> Vec<&DataPack> {
        self.packs.iter().filter(|p| p.enabled).collect()
    }

    /// Number of packs.
    pub fn len(&self) -> usize {
        self.packs.len()
    }

    /// True if no packs are stored.
    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Drop every pack and restart the colour cycle.
    pub fn clear(&mut self) {
        self.packs.clear();
        self.color_index = 0;
    }
}

fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn strip_zip_suffix(name: &str) -> &str {
    let len = name.len();
    if len >= 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".zip") {
        &name[..len - 4]
    } else {
        name
    }
}

fn nested_pack_name(path: &str) -> String {
    let stem = strip_zip_suffix(path);
    stem.rsplit('/').next().unwrap_or(stem).to_string()
}
