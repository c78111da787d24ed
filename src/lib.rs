//! # tag-graph-kernel
//!
//! Tag dependency graphs for game content archives.
//!
//! The kernel answers one question:
//!
//! > Given a content version and a set of data packs, which tags include what?
//!
//! ## Core Contract
//!
//! 1. Extract a **base graph** once from a content archive: every tag file
//!    becomes a tag node, every value an edge to a tag or element node
//! 2. Merge uploaded **overlay packs** on top, in upload order, honouring
//!    `replace` semantics
//! 3. Rebuild the working graph from scratch after every overlay change
//!    and export it as a flat, ordered element list
//!
//! ## Architecture
//!
//! ```text
//! Archive → BaseGraphExtractor → GraphSnapshot (base, immutable)
//!                                     ↓
//!        OverlayStore (packs) → merge::rebuild → GraphSnapshot (working) → GraphExport
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same archive + same packs in the same order → identical fingerprint
//! - Node ordering is canonical (by NodeId)
//! - Edges are unique per `source->target` key and never dangle

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod identifier;
pub mod tag_file;
pub mod archive;
pub mod canonical;
pub mod graph;
pub mod config;
pub mod manifest;
pub mod extract;
pub mod overlay;
pub mod merge;
pub mod compat;
pub mod export;
pub mod session;

// Re-exports
pub use types::{NodeId, NodeKind, Node, Attribution, ReplacedBy, Edge, EdgeKey};
pub use types::{PackId, TagValue, TagDefinition, DataPack};
pub use archive::{Archive, ArchiveError, ArchiveOpener, InMemoryArchive, ZipArchiveReader, ZipOpener};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use graph::{GraphError, GraphSnapshot, GraphStats, Registration};
pub use config::{ConfigError, GraphConfig};
pub use extract::{
    BaseGraphExtractor, CancellationFlag, EntryParseError, ExtractError,
    ExtractProgress, ExtractReport, Extraction,
};
pub use overlay::{OverlayError, OverlayStore, UploadOutcome};
pub use merge::{rebuild, MergeSummary};
pub use compat::{Compatibility, CompatibilityWarning, WarningTone};
pub use export::{GraphElement, GraphExport, NodeRecord, EdgeRecord};
pub use session::{Session, SessionError};

/// Schema version of [`GraphExport`].
/// Increment on breaking changes to any exported record.
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Namespace assumed for identifiers written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Prefix marking a tag value as a reference to another tag.
pub const TAG_REFERENCE_MARKER: char = '#';
