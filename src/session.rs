//! Viewer session: the explicit owner of all graph state.
//!
//! A session holds one immutable base graph, the overlay store, and the
//! current working graph. Every overlay-affecting call rebuilds the
//! working graph in full before returning; the previous working graph is
//! only replaced once the new one is complete.

use std::sync::Arc;

use tracing::info;

use crate::archive::{Archive, ArchiveOpener, ZipOpener};
use crate::compat::{self, Compatibility, CompatibilityWarning};
use crate::config::GraphConfig;
use crate::export::GraphExport;
use crate::extract::{BaseGraphExtractor, CancellationFlag, ExtractError, ExtractProgress, ExtractReport};
use crate::graph::{GraphError, GraphSnapshot};
use crate::merge;
use crate::overlay::{OverlayStore, UploadOutcome};
use crate::types::{DataPack, PackId};

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Base graph extraction failed.
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),
    /// Merge produced an inconsistent graph.
    #[error("Merge failed: {0}")]
    Merge(#[from] GraphError),
    /// No pack with this id.
    #[error("Unknown data pack: {0}")]
    UnknownPack(PackId),
}

/// Graph state for one viewer.
pub struct Session<O: ArchiveOpener + Clone = ZipOpener> {
    config: GraphConfig,
    opener: O,
    extractor: BaseGraphExtractor,
    base: Option<Arc<GraphSnapshot>>,
    overlays: OverlayStore<O>,
    working: Arc<GraphSnapshot>,
    last_report: Option<ExtractReport>,
}

impl Default for Session<ZipOpener> {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl Session<ZipOpener> {
    /// Create a session reading zip archives.
    pub fn new(config: GraphConfig) -> Self {
        Self::with_opener(config, ZipOpener)
    }
}

impl<O: ArchiveOpener + Clone> Session<O> {
    /// Create a session with a custom archive opener.
    pub fn with_opener(config: GraphConfig, opener: O) -> Self {
        Self {
            extractor: BaseGraphExtractor::from_config(&config),
            overlays: OverlayStore::new(opener.clone(), &config),
            opener,
            config,
            base: None,
            working: Arc::new(GraphSnapshot::new()),
            last_report: None,
        }
    }

    /// Extract a new base graph from `archive` and rebuild.
    ///
    /// Uploaded packs are kept and merged onto the new base.
    pub async fn load_base<F>(
        &mut self,
        archive: &dyn Archive,
        on_progress: F,
        cancel: Option<&CancellationFlag>,
    ) -> Result<&ExtractReport, SessionError>
    where
        F: FnMut(&ExtractProgress),
    {
        let extraction = self.extractor.extract(archive, on_progress, cancel).await?;
        self.base = Some(Arc::new(extraction.graph));
        self.rebuild()?;
        Ok(&*self.last_report.insert(extraction.report))
    }

    /// Open `bytes` as an archive and [`load_base`](Self::load_base) it.
    pub async fn load_base_bytes<F>(
        &mut self,
        bytes: Vec<u8>,
        on_progress: F,
        cancel: Option<&CancellationFlag>,
    ) -> Result<&ExtractReport, SessionError>
    where
        F: FnMut(&ExtractProgress),
    {
        let archive = self.opener.open(bytes).map_err(ExtractError::from)?;
        self.load_base(archive.as_ref(), on_progress, cancel).await
    }

    /// Upload an overlay archive and rebuild.
    pub async fn upload(&mut self, bytes: Vec<u8>, file_name: &str) -> Result<UploadOutcome, SessionError> {
        let outcome = self.overlays.upload(bytes, file_name).await;
        self.rebuild()?;
        Ok(outcome)
    }

    /// Flip a pack's enabled flag and rebuild. Returns the new state.
    pub fn toggle(&mut self, id: &PackId) -> Result<bool, SessionError> {
        let enabled = self
            .overlays
            .toggle(id)
            .ok_or_else(|| SessionError::UnknownPack(id.clone()))?;
        self.rebuild()?;
        Ok(enabled)
    }

    /// Remove a pack and rebuild.
    pub fn remove(&mut self, id: &PackId) -> Result<(), SessionError> {
        if !self.overlays.remove(id) {
            return Err(SessionError::UnknownPack(id.clone()));
        }
        self.rebuild()
    }

    /// Change a pack's colour and rebuild.
    pub fn recolor(&mut self, id: &PackId, color: impl Into<String>) -> Result<(), SessionError> {
        if !self.overlays.recolor(id, color) {
            return Err(SessionError::UnknownPack(id.clone()));
        }
        self.rebuild()
    }

    /// Drop every pack and rebuild.
    pub fn clear_packs(&mut self) -> Result<(), SessionError> {
        self.overlays.clear();
        self.rebuild()
    }

    /// Recompute the working graph from the base graph and enabled packs.
    ///
    /// Without a base graph the working graph is empty.
    pub fn rebuild(&mut self) -> Result<(), SessionError> {
        let working = match &self.base {
            Some(base) => merge::rebuild(base, self.overlays.list_enabled())?,
            None => GraphSnapshot::new(),
        };
        info!(
            nodes = working.num_nodes(),
            edges = working.num_edges(),
            fingerprint = %working.fingerprint(),
            "Working graph ready"
        );
        self.working = Arc::new(working);
        Ok(())
    }

    /// Compatibility of a pack with the loaded content version.
    pub fn pack_compatibility(&self, id: &PackId) -> Result<Compatibility, SessionError> {
        let pack = self.pack(id)?;
        Ok(compat::compatibility(pack.pack_format, self.expected_pack_format()))
    }

    /// Warning to show for a pack, if any.
    pub fn pack_warning(&self, id: &PackId) -> Result<Option<CompatibilityWarning>, SessionError> {
        let pack = self.pack(id)?;
        let expected = self.expected_pack_format();
        let level = compat::compatibility(pack.pack_format, expected);
        Ok(compat::message(level, pack.pack_format, expected))
    }

    fn pack(&self, id: &PackId) -> Result<&DataPack, SessionError> {
        self.overlays
            .get(id)
            .ok_or_else(|| SessionError::UnknownPack(id.clone()))
    }

    /// Pack format of the loaded content version.
    pub fn expected_pack_format(&self) -> Option<u32> {
        self.base.as_ref().and_then(|b| b.pack_format())
    }

    /// The current working graph.
    pub fn working_graph(&self) -> Arc<GraphSnapshot> {
        Arc::clone(&self.working)
    }

    /// The base graph, once loaded.
    pub fn base_graph(&self) -> Option<Arc<GraphSnapshot>> {
        self.base.clone()
    }

    /// Export the working graph.
    pub fn export(&self) -> GraphExport {
        self.working.export()
    }

    /// The overlay store.
    pub fn overlays(&self) -> &OverlayStore<O> {
        &self.overlays
    }

    /// Report of the last base extraction.
    pub fn last_report(&self) -> Option<&ExtractReport> {
        self.last_report.as_ref()
    }

    /// Session configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }
}
