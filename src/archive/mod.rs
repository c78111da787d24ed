//! Archive readers.
//!
//! The kernel only needs to list entry paths and read entry bytes; the
//! container codec lives behind the [`Archive`] trait.

pub mod memory;
pub mod zip_reader;

use async_trait::async_trait;

/// Error type for archive access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveError {
    /// Bytes could not be decoded as an archive.
    #[error("Failed to open archive: {0}")]
    Open(String),
    /// No entry exists at the requested path.
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
    /// Entry exists but could not be read or decoded.
    #[error("Failed to read entry {path}: {reason}")]
    Read {
        /// Entry path.
        path: String,
        /// Underlying failure.
        reason: String,
    },
}

/// A readable archive.
///
/// `entries` must return paths in a deterministic order and must not
/// include directory entries.
#[async_trait]
pub trait Archive: Send + Sync {
    /// List entry paths.
    fn entries(&self) -> Vec<String>;

    /// Read an entry's bytes.
    async fn read_entry(&self, path: &str) -> Result<Vec<u8>, ArchiveError>;

    /// Read an entry as UTF-8 text.
    async fn read_entry_string(&self, path: &str) -> Result<String, ArchiveError> {
        let bytes = self.read_entry(path).await?;
        String::from_utf8(bytes).map_err(|e| ArchiveError::Read {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Opens raw bytes as an [`Archive`].
pub trait ArchiveOpener: Send + Sync {
    /// Decode `bytes`, failing with [`ArchiveError::Open`] on corrupt input.
    fn open(&self, bytes: Vec<u8>) -> Result<Box<dyn Archive>, ArchiveError>;
}

pub use memory::InMemoryArchive;
pub use zip_reader::{ZipArchiveReader, ZipOpener};
