//! In-memory ZIP container access
//!
//! Entries are decompressed on lookup, one at a time, and never past the
//! entry limit. Declared sizes are only trusted up to that limit.

use std::io::{Cursor, Read};

use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

/// Largest decompressed entry accepted by default
pub const DEFAULT_ENTRY_LIMIT: u64 = 64 * 1024 * 1024;

/// The bytes are not a readable ZIP container
#[derive(Debug, Error)]
pub enum ArchiveFormatError {
    #[error("Failed to read ZIP archive: {0}")]
    Zip(#[from] ZipError),

    #[error("Failed to read archive entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive entry {path} exceeds {limit} bytes")]
    EntryTooLarge { path: String, limit: u64 },
}

/// Opened container over borrowed bytes
pub struct Archive<'a> {
    zip: ZipArchive<Cursor<&'a [u8]>>,
    entry_limit: u64,
}

impl std::fmt::Debug for Archive<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("entries", &self.len())
            .field("entry_limit", &self.entry_limit)
            .finish()
    }
}

impl<'a> Archive<'a> {
    /// Open a container from raw bytes. Only the central directory is read.
    pub fn open(data: &'a [u8]) -> Result<Self, ArchiveFormatError> {
        let zip = ZipArchive::new(Cursor::new(data))?;
        tracing::debug!(entries = zip.len(), "Opened archive");
        Ok(Self {
            zip,
            entry_limit: DEFAULT_ENTRY_LIMIT,
        })
    }

    /// Cap the decompressed size of any single entry
    pub fn with_entry_limit(mut self, entry_limit: u64) -> Self {
        self.entry_limit = entry_limit;
        self
    }

    /// Number of file entries
    pub fn len(&self) -> usize {
        self.paths().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        !path.ends_with('/') && self.zip.index_for_name(path).is_some()
    }

    /// Internal paths of file entries, in directory order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.zip.file_names().filter(|name| !name.ends_with('/'))
    }

    /// Decompressed bytes of an entry, `None` when there is no such file
    pub fn read_bytes(&mut self, path: &str) -> Result<Option<Vec<u8>>, ArchiveFormatError> {
        let file = match self.zip.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !file.is_file() {
            return Ok(None);
        }

        let limit = self.entry_limit;
        let too_large = || ArchiveFormatError::EntryTooLarge {
            path: path.to_string(),
            limit,
        };
        if file.size() > limit {
            return Err(too_large());
        }

        let mut content = Vec::with_capacity(file.size() as usize);
        file.take(limit.saturating_add(1)).read_to_end(&mut content)?;
        if content.len() as u64 > limit {
            return Err(too_large());
        }
        Ok(Some(content))
    }

    /// Entry decoded as UTF-8.
    ///
    /// Invalid sequences are replaced and a leading byte order mark is
    /// dropped, so a badly encoded chapter still yields text.
    pub fn read_text(&mut self, path: &str) -> Result<Option<String>, ArchiveFormatError> {
        let Some(bytes) = self.read_bytes(path)? else {
            return Ok(None);
        };
        let mut text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        if text.starts_with('\u{feff}') {
            text.remove(0);
        }
        Ok(Some(text))
    }
}
