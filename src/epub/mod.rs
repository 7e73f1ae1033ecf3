//! EPUB text extraction module
//!
//! Opens an EPUB container, follows `META-INF/container.xml` to the package
//! document, and concatenates the plain text of the spine in reading order.

mod archive;
mod extractor;
mod path;

pub use archive::{Archive, ArchiveFormatError, DEFAULT_ENTRY_LIMIT};
pub use extractor::{
    extract_text, EpubExtractor, Extraction, ExtractionError, SkippedItem, CONTAINER_PATH,
    MIN_TEXT_CHARS, PARAGRAPH_SEPARATOR,
};
pub use path::resolve;

/// Build an EPUB in memory for tests
#[cfg(test)]
pub(crate) use archive::fixtures::single_chapter_epub;
