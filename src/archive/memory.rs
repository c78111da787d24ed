//! In-memory archive for testing.

use std::collections::BTreeMap;
use async_trait::async_trait;

use super::{Archive, ArchiveError};

/// In-memory archive.
///
/// Uses a BTreeMap for deterministic entry order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchive {
    entries: BTreeMap<String, Vec<u8>>,
}

impl InMemoryArchive {
    /// Create a new empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an archive from `(path, bytes)` pairs.
    pub fn from_entries<P, B>(entries: impl IntoIterator<Item = (P, B)>) -> Self
    where
        P: Into<String>,
        B: Into<Vec<u8>>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(p, b)| (p.into(), b.into()))
                .collect(),
        }
    }

    /// Add or overwrite an entry.
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), bytes.into());
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Archive for InMemoryArchive {
    fn entries(&self) -> Vec<String> {
        self.entries
            .keys()
            .filter(|p| !p.ends_with('/'))
            .cloned()
            .collect()
    }

    async fn read_entry(&self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| ArchiveError::EntryNotFound(path.to_string()))
    }
}
