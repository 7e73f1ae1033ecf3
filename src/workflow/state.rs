//! Wizard state

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cover::{CoverImageError, TextOverlayConfig};
use crate::epub::ExtractionError;
use crate::generation::{GenerationError, PodcastContent};
use crate::history::HistoryError;

pub const STEP_DISCOVER: u8 = 1;
pub const STEP_UPLOAD: u8 = 2;
pub const STEP_SCRIPT: u8 = 3;
pub const STEP_COVER: u8 = 4;
pub const STEP_PUBLISH: u8 = 5;

/// Upload size cap, 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Progress of one generation step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Book prepared for script generation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpload {
    pub file_name: String,
    pub mime_type: String,
    /// Size of the uploaded file in bytes
    pub size: usize,
    /// Content sent to the generator, base64 encoded
    #[serde(skip)]
    pub base64: String,
    /// Extracted text, present for EPUB uploads
    #[serde(skip)]
    pub text: Option<String>,
    /// Character count of the extracted text
    pub text_chars: Option<usize>,
}

/// Cover as currently shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    pub base64: String,
}

impl GeneratedImage {
    pub fn from_data_url(data_url: String) -> Self {
        Self {
            base64: data_url.clone(),
            url: data_url,
        }
    }
}

/// External site linked from the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublishDestination {
    pub step: u8,
    pub name: &'static str,
    pub url: &'static str,
    pub tagline: &'static str,
}

/// Book discovery site linked from the first step
pub const DISCOVER_DESTINATION: PublishDestination = PublishDestination {
    step: STEP_DISCOVER,
    name: "Dushupai",
    url: "https://www.dushupai.com/",
    tagline: "Find a book worth talking about",
};

/// Podcast hosting sites linked from the last step
pub const PUBLISH_DESTINATIONS: [PublishDestination; 2] = [
    PublishDestination {
        step: STEP_PUBLISH,
        name: "Xiaoyuzhou Creator Center",
        url: "https://podcaster.xiaoyuzhoufm.com/dashboard",
        tagline: "Nothing Impossible, Start here.",
    },
    PublishDestination {
        step: STEP_PUBLISH,
        name: "Ximalaya Creator Center",
        url: "https://studio.ximalaya.com/",
        tagline: "Let your voice travel further",
    },
];

/// Everything the wizard shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub current_step: u8,
    pub book: Option<BookUpload>,
    pub content_status: StepStatus,
    pub generated_content: Option<PodcastContent>,
    pub cover_status: StepStatus,
    pub generated_cover: Option<GeneratedImage>,
    pub error: Option<String>,
    /// Set when the book text was cut before generation
    pub safety_warning: Option<String>,
    pub is_editing_cover: bool,
    pub overlay: TextOverlayConfig,
    /// Generated cover without any overlay
    #[serde(skip)]
    pub original_cover: Option<String>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            current_step: STEP_DISCOVER,
            book: None,
            content_status: StepStatus::Idle,
            generated_content: None,
            cover_status: StepStatus::Idle,
            generated_cover: None,
            error: None,
            safety_warning: None,
            is_editing_cover: false,
            overlay: TextOverlayConfig::default(),
            original_cover: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("File size cannot exceed {} MB", .limit / (1024 * 1024))]
    FileTooLarge { size: usize, limit: usize },

    #[error("No book has been uploaded")]
    NoBookLoaded,

    #[error("No cover has been generated")]
    NoCover,

    #[error("The cover is not being edited")]
    NotEditing,

    #[error("A generation is already running")]
    Busy,

    #[error("Step {0} does not exist")]
    InvalidStep(u8),

    #[error("History item not found: {0}")]
    UnknownHistoryItem(String),

    #[error("Failed to read the file, if it is an EPUB make sure it is not corrupted: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Invalid cover image: {0}")]
    Cover(#[from] CoverImageError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serializes_camel_case() {
        let state = WorkflowState::default();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["currentStep"], 1);
        assert_eq!(json["contentStatus"], "idle");
        assert_eq!(json["overlay"]["podcastTitle"], "NOTHING IMPOSSIBLE");
        assert!(json.get("originalCover").is_none());
    }

    #[test]
    fn test_upload_hides_payload() {
        let upload = BookUpload {
            file_name: "walden.epub".to_string(),
            mime_type: "text/plain".to_string(),
            size: 10,
            base64: "aGk=".to_string(),
            text: Some("hi".to_string()),
            text_chars: Some(2),
        };
        let json = serde_json::to_value(&upload).unwrap();

        assert_eq!(json["fileName"], "walden.epub");
        assert_eq!(json["textChars"], 2);
        assert!(json.get("base64").is_none());
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_file_too_large_message() {
        let err = WorkflowError::FileTooLarge {
            size: DEFAULT_MAX_UPLOAD_BYTES + 1,
            limit: DEFAULT_MAX_UPLOAD_BYTES,
        };
        assert_eq!(err.to_string(), "File size cannot exceed 50 MB");
    }
}
