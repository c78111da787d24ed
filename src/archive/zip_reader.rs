//! Zip-backed archive reader.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use parking_lot::Mutex;
use zip::result::ZipError;
use zip::ZipArchive;

use super::{Archive, ArchiveError, ArchiveOpener};

/// Upper bound on the buffer reserved before reading an entry.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// Archive over an in-memory zip file.
///
/// Entry reads need exclusive access to the decoder, so it sits behind a
/// mutex; the entry list is captured once at open time.
pub struct ZipArchiveReader {
    names: Vec<String>,
    inner: Mutex<ZipArchive<Cursor<Vec<u8>>>>,
}

impl ZipArchiveReader {
    /// Decode `bytes` as a zip archive.
    pub fn open(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ArchiveError::Open(e.to_string()))?;

        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect();
        names.sort();

        Ok(Self {
            names,
            inner: Mutex::new(archive),
        })
    }

    fn read_sync(&self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        let mut archive = self.inner.lock();
        let mut file = archive.by_name(path).map_err(|e| match e {
            ZipError::FileNotFound => ArchiveError::EntryNotFound(path.to_string()),
            other => ArchiveError::Read {
                path: path.to_string(),
                reason: other.to_string(),
            },
        })?;

        // Declared sizes come from the header; cap the up-front allocation
        let mut buf = Vec::with_capacity(file.size().min(MAX_PREALLOCATION) as usize);
        file.read_to_end(&mut buf).map_err(|e| ArchiveError::Read {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(buf)
    }
}

impl std::fmt::Debug for ZipArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchiveReader")
            .field("entries", &self.names.len())
            .finish()
    }
}

#[async_trait]
impl Archive for ZipArchiveReader {
    fn entries(&self) -> Vec<String> {
        self.names.clone()
    }

    async fn read_entry(&self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        self.read_sync(path)
    }
}

/// Opens bytes as [`ZipArchiveReader`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipOpener;

impl ArchiveOpener for ZipOpener {
    fn open(&self, bytes: Vec<u8>) -> Result<Box<dyn Archive>, ArchiveError> {
        Ok(Box::new(ZipArchiveReader::open(bytes)?))
    }
}
