//! Base graph extraction.
//!
//! Turns every tag file of a content archive into graph nodes and edges.
//!
//! ## Algorithm
//!
//! 1. List entries matching [`TagPathPattern::Base`]
//! 2. Process them in fixed-size batches, yielding to the runtime and
//!    reporting progress after each batch
//! 3. For each entry: decode the tag file, register the tag as an
//!    authoritative node, then for each value resolve the reference,
//!    register the target (placeholder unless already defined) and add
//!    the edge
//! 4. A bad entry is recorded in the report and skipped; only archive
//!    failures and cancellation abort the run

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::archive::{Archive, ArchiveError};
use crate::config::GraphConfig;
use crate::graph::{GraphError, GraphSnapshot};
use crate::identifier::{resolve_reference, TagPath, TagPathPattern};
use crate::manifest::pack_format_from_version_json;
use crate::tag_file::TagFile;
use crate::types::NodeKind;

/// Error type for extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The archive itself failed.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    /// Internal consistency violation while building the graph.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    /// The caller cancelled the run.
    #[error("Extraction cancelled after {processed} of {total} entries")]
    Cancelled {
        /// Entries processed before cancellation.
        processed: usize,
        /// Entries matched.
        total: usize,
    },
}

/// One tag entry that could not be read or decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to process {path}: {reason}")]
pub struct EntryParseError {
    /// Entry path.
    pub path: String,
    /// Failure description.
    pub reason: String,
}

/// Progress update emitted after each batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractProgress {
    /// Human-readable status.
    pub message: String,
    /// 0..=100.
    pub percent: u8,
}

/// Shared cancellation flag, checked once per batch.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Entries matching the tag pattern.
    pub entries_total: usize,
    /// Entries successfully applied.
    pub entries_parsed: usize,
    /// Entries skipped.
    pub errors: Vec<EntryParseError>,
}

/// Result of a successful extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The base graph.
    pub graph: GraphSnapshot,
    /// Run counters.
    pub report: ExtractReport,
}

/// Builds base graphs from content archives.
#[derive(Debug, Clone)]
pub struct BaseGraphExtractor {
    batch_size: usize,
    version_entry: String,
}

impl Default for BaseGraphExtractor {
    fn default() -> Self {
        Self::from_config(&GraphConfig::default())
    }
}

impl BaseGraphExtractor {
    /// Create an extractor from configuration.
    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            version_entry: config.version_entry.clone(),
        }
    }

    /// Override the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Extract the tag graph of `archive`.
    pub async fn extract<F>(
        &self,
        archive: &dyn Archive,
        mut on_progress: F,
        cancel: Option<&CancellationFlag>,
    ) -> Result<Extraction, ExtractError>
    where
        F: FnMut(&ExtractProgress),
    {
        let tag_entries: Vec<(String, TagPath)> = archive
            .entries()
            .into_iter()
            .filter_map(|path| TagPathPattern::Base.parse(&path).map(|tp| (path, tp)))
            .collect();

        let total = tag_entries.len();
        info!(total, batch_size = self.batch_size, "Extracting base tag graph");
        on_progress(&ExtractProgress {
            message: format!("Found {} tags. Parsing...", total),
            percent: 0,
        });

        let mut graph = GraphSnapshot::new();
        let mut report = ExtractReport {
            entries_total: total,
            ..Default::default()
        };
        let mut processed = 0;

        for batch in tag_entries.chunks(self.batch_size) {
            if cancel.map_or(false, |c| c.is_cancelled()) {
                warn!(processed, total, "Extraction cancelled");
                return Err(ExtractError::Cancelled { processed, total });
            }

            for (path, tag_path) in batch {
                let outcome = match archive.read_entry(path).await {
                    Ok(bytes) => TagFile::parse(&bytes).map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                match outcome {
                    Ok(file) => {
                        apply_tag_file(&mut graph, path, tag_path, file)?;
                        report.entries_parsed += 1;
                    }
                    Err(reason) => {
                        warn!(path = %path, reason = %reason, "Skipping tag entry");
                        report.errors.push(EntryParseError {
                            path: path.clone(),
                            reason,
                        });
                    }
                }
            }

            processed += batch.len();
            let percent = percent_of(processed, total);
            on_progress(&ExtractProgress {
                message: format!("Parsing tags... {}%", percent),
                percent,
            });

            tokio::task::yield_now().await;
        }

        if total == 0 {
            on_progress(&ExtractProgress {
                message: "Parsing tags... 100%".to_string(),
                percent: 100,
            });
        }

        graph.set_pack_format(self.read_pack_format(archive).await);

        if !report.errors.is_empty() {
            warn!(errors = report.errors.len(), "Some tag entries failed to load");
        }
        let stats = graph.stats();
        info!(
            tags = stats.tags,
            elements = stats.elements,
            edges = graph.num_edges(),
            pack_format = ?graph.pack_format(),
            "Base tag graph extracted"
        );

        Ok(Extraction { graph, report })
    }

    async fn read_pack_format(&self, archive: &dyn Archive) -> Option<u32> {
        let bytes = match archive.read_entry(&self.version_entry).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "No version descriptor in content archive");
                return None;
            }
        };
        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(json) => pack_format_from_version_json(&json),
            Err(e) => {
                warn!(error = %e, "Unreadable version descriptor");
                None
            }
        }
    }
}

/// Register one decoded tag file in `graph`.
pub(crate) fn apply_tag_file(
    graph: &mut GraphSnapshot,
    path: &str,
    tag_path: &TagPath,
    file: TagFile,
) -> Result<(), GraphError> {
    let id = tag_path.definition_id();
    graph.register_node(
        id.clone(),
        NodeKind::Tag,
        &tag_path.category,
        Some((path.to_string(), file.payload)),
    );

    for value in &file.values {
        let (target, kind) = resolve_reference(value.raw_id(), &tag_path.category);
        graph.ensure_node(&target, kind, &tag_path.category);
        graph.add_edge(&id, &target)?;
    }
    Ok(())
}

fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100) / total).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::InMemoryArchive;
    use crate::types::NodeId;

    fn scenario_archive() -> InMemoryArchive {
        InMemoryArchive::from_entries([
            (
                "data/minecraft/tags/block/logs.json",
                br##"{"values": ["minecraft:oak_log", "#minecraft:stripped_logs"]}"##.to_vec(),
            ),
            ("data/minecraft/recipes/stick.json", b"{}".to_vec()),
            ("version.json", br#"{"pack_version": {"data": 61}}"#.to_vec()),
        ])
    }

    #[tokio::test]
    async fn test_scenario_extraction() {
        let extraction = BaseGraphExtractor::default()
            .extract(&scenario_archive(), |_| {}, None)
            .await
            .unwrap();
        let graph = &extraction.graph;

        let logs = graph.node(&NodeId::new("block:minecraft:logs")).unwrap();
        assert_eq!(logs.kind, NodeKind::Tag);
        assert!(!logs.is_placeholder());

        let oak = graph.node(&NodeId::new("block:minecraft:oak_log")).unwrap();
        assert_eq!(oak.kind, NodeKind::Element);
        assert!(oak.is_placeholder());

        let stripped = graph.node(&NodeId::new("block:minecraft:stripped_logs")).unwrap();
        assert_eq!(stripped.kind, NodeKind::Tag);
        assert!(stripped.is_placeholder());

        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.stats().tags, 2);
        assert_eq!(graph.stats().elements, 1);
        assert_eq!(graph.pack_format(), Some(61));
        assert_eq!(extraction.report.entries_total, 1);
        assert_eq!(extraction.report.entries_parsed, 1);
    }

    #[tokio::test]
    async fn test_bad_entry_is_counted_not_fatal() {
        let mut archive = scenario_archive();
        archive.insert("data/minecraft/tags/item/broken.json", b"{ nope".to_vec());

        let extraction = BaseGraphExtractor::default()
            .extract(&archive, |_| {}, None)
            .await
            .unwrap();

        assert_eq!(extraction.report.entries_total, 2);
        assert_eq!(extraction.report.entries_parsed, 1);
        assert_eq!(extraction.report.errors.len(), 1);
        assert_eq!(extraction.report.errors[0].path, "data/minecraft/tags/item/broken.json");
        assert!(extraction.graph.contains_node(&NodeId::new("block:minecraft:logs")));
    }

    #[tokio::test]
    async fn test_definition_after_reference_is_upgraded() {
        let mut archive = scenario_archive();
        // Sorts after logs.json, so stripped_logs is first seen as a placeholder
        archive.insert(
            "data/minecraft/tags/block/stripped_logs.json",
            br#"{"values": ["stripped_oak_log"]}"#.to_vec(),
        );

        let graph = BaseGraphExtractor::default()
            .extract(&archive, |_| {}, None)
            .await
            .unwrap()
            .graph;

        let stripped = graph.node(&NodeId::new("block:minecraft:stripped_logs")).unwrap();
        assert!(!stripped.is_placeholder());
        assert_eq!(graph.num_nodes(), 4);
        assert!(graph.validate().is_ok());
    }

    #[tokio::test]
    async fn test_progress_reported_per_batch() {
        let mut archive = InMemoryArchive::new();
        for i in 0..5 {
            archive.insert(format!("data/minecraft/tags/item/t{}.json", i), br#"{"values":[]}"#.to_vec());
        }

        let mut updates = Vec::new();
        BaseGraphExtractor::default()
            .with_batch_size(2)
            .extract(&archive, |p| updates.push(p.percent), None)
            .await
            .unwrap();

        // Initial update plus one per batch of 2, 2, 1
        assert_eq!(updates, vec![0, 40, 80, 100]);
    }

    #[tokio::test]
    async fn test_cancellation_checked_per_batch() {
        let mut archive = InMemoryArchive::new();
        for i in 0..4 {
            archive.insert(format!("data/minecraft/tags/item/t{}.json", i), br#"{"values":[]}"#.to_vec());
        }
        let cancel = CancellationFlag::new();
        let trigger = cancel.clone();

        let result = BaseGraphExtractor::default()
            .with_batch_size(2)
            .extract(
                &archive,
                |p| {
                    if p.percent >= 50 {
                        trigger.cancel();
                    }
                },
                Some(&cancel),
            )
            .await;

        assert!(matches!(
            result,
            Err(ExtractError::Cancelled { processed: 2, total: 4 })
        ));
    }

    #[tokio::test]
    async fn test_empty_archive() {
        let extraction = BaseGraphExtractor::default()
            .extract(&InMemoryArchive::new(), |_| {}, None)
            .await
            .unwrap();
        assert_eq!(extraction.graph.num_nodes(), 0);
        assert_eq!(extraction.graph.pack_format(), None);
    }
}
