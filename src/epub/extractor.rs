//! Plain-text extraction from EPUB packages
//!
//! Structure is strict: the container descriptor and the package document
//! must exist and parse. Items are lenient: spine entries that point
//! nowhere and content documents missing from the archive are skipped.
//! The result must still clear a minimum length.

use std::collections::HashMap;

use thiserror::Error;

use super::archive::{Archive, ArchiveFormatError, DEFAULT_ENTRY_LIMIT};
use super::path::resolve;
use crate::markup::{Document, MalformedMarkupError};

/// Fixed location of the container descriptor
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Separator appended after every content document
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Minimum number of characters a successful extraction produces
pub const MIN_TEXT_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid container: {0}")]
    InvalidContainer(#[source] ArchiveFormatError),

    #[error("missing container descriptor")]
    MissingContainerDescriptor {
        #[source]
        source: Option<MalformedMarkupError>,
    },

    #[error("no root file declared")]
    NoRootFile,

    #[error("missing package document: {path}")]
    MissingPackageDocument {
        path: String,
        #[source]
        source: Option<MalformedMarkupError>,
    },

    #[error("extraction produced insufficient text ({length} of {minimum} characters)")]
    InsufficientText { length: usize, minimum: usize },
}

/// Why a spine entry contributed no text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkippedItem {
    /// `itemref` without an `idref` attribute
    MissingIdref { position: usize },
    /// `idref` not declared in the manifest
    UnknownIdref { position: usize, idref: String },
    /// Resolved content path is not in the archive
    MissingContent { position: usize, path: String },
}

/// Result of a successful extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    /// Content documents that contributed text, in spine order
    pub documents: Vec<String>,
    pub skipped: Vec<SkippedItem>,
}

/// EPUB text extractor
#[derive(Debug, Clone)]
pub struct EpubExtractor {
    min_chars: usize,
    entry_limit: u64,
}

impl Default for EpubExtractor {
    fn default() -> Self {
        Self {
            min_chars: MIN_TEXT_CHARS,
            entry_limit: DEFAULT_ENTRY_LIMIT,
        }
    }
}

impl EpubExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the minimum output length
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Override the largest decompressed entry the extractor will read
    pub fn with_entry_limit(mut self, entry_limit: u64) -> Self {
        self.entry_limit = entry_limit;
        self
    }

    /// Extract the full text of a package in reading order
    pub fn extract(&self, data: &[u8]) -> Result<Extraction, ExtractionError> {
        let mut archive = Archive::open(data)
            .map_err(ExtractionError::InvalidContainer)?
            .with_entry_limit(self.entry_limit);

        let package_path = find_package_path(&mut archive)?;
        let package_text = read_entry(&mut archive, &package_path)?.ok_or_else(|| {
            ExtractionError::MissingPackageDocument {
                path: package_path.clone(),
                source: None,
            }
        })?;
        let package = Document::parse_xml(&package_text).map_err(|source| {
            ExtractionError::MissingPackageDocument {
                path: package_path.clone(),
                source: Some(source),
            }
        })?;

        let manifest = build_manifest(&package);
        tracing::debug!(
            package = %package_path,
            manifest_items = manifest.len(),
            "Parsed package document"
        );

        let mut text = String::new();
        let mut documents = Vec::new();
        let mut skipped = Vec::new();

        for (position, itemref) in package.select(&["spine", "itemref"]).into_iter().enumerate() {
            let Some(idref) = itemref.attribute("idref") else {
                tracing::debug!(position, "Skipping itemref without idref");
                skipped.push(SkippedItem::MissingIdref { position });
                continue;
            };

            let Some(href) = manifest.get(idref) else {
                tracing::warn!(position, idref, "Spine item not declared in manifest");
                skipped.push(SkippedItem::UnknownIdref {
                    position,
                    idref: idref.to_string(),
                });
                continue;
            };

            let content_path = resolve(&package_path, href);
            let Some(content) = read_entry(&mut archive, &content_path)? else {
                tracing::warn!(position, path = %content_path, "Content document missing from archive");
                skipped.push(SkippedItem::MissingContent {
                    position,
                    path: content_path,
                });
                continue;
            };

            let document = Document::parse_html(&content);
            text.push_str(&document.text_content());
            text.push_str(PARAGRAPH_SEPARATOR);
            documents.push(content_path);
        }

        let length = text.chars().count();
        if length < self.min_chars {
            return Err(ExtractionError::InsufficientText {
                length,
                minimum: self.min_chars,
            });
        }

        tracing::info!(
            documents = documents.len(),
            skipped = skipped.len(),
            chars = length,
            "Extracted EPUB text"
        );

        Ok(Extraction {
            text,
            documents,
            skipped,
        })
    }
}

/// Extract the full text of a package with the default minimum length
pub fn extract_text(data: &[u8]) -> Result<String, ExtractionError> {
    EpubExtractor::default().extract(data).map(|e| e.text)
}

fn find_package_path(archive: &mut Archive<'_>) -> Result<String, ExtractionError> {
    let text = read_entry(archive, CONTAINER_PATH)?
        .ok_or(ExtractionError::MissingContainerDescriptor { source: None })?;
    let container = Document::parse_xml(&text)
        .map_err(|source| ExtractionError::MissingContainerDescriptor { source: Some(source) })?;

    container
        .find_first("rootfile")
        .and_then(|rootfile| rootfile.attribute("full-path"))
        .map(str::to_string)
        .ok_or(ExtractionError::NoRootFile)
}

/// `Ok(None)` when the entry is absent; unreadable or oversized entries
/// make the whole container invalid
fn read_entry(archive: &mut Archive<'_>, path: &str) -> Result<Option<String>, ExtractionError> {
    archive.read_text(path).map_err(ExtractionError::InvalidContainer)
}

fn build_manifest(package: &Document) -> HashMap<String, String> {
    package
        .select(&["manifest", "item"])
        .into_iter()
        .filter_map(|item| Some((item.attribute("id")?.to_string(), item.attribute("href")?.to_string())))
        .collect()
}
