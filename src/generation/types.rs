//! Generation wire types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RPC action that produces a podcast script
pub const ACTION_GENERATE_SCRIPT: &str = "generateScript";

/// RPC action that produces a cover image
pub const ACTION_GENERATE_COVER: &str = "generateCover";

/// Generated podcast episode text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastContent {
    pub title: String,
    pub intro: String,
    pub script: String,
}

/// `{action, payload}` request body understood by the generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcEnvelope {
    pub action: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Error body returned by the generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub error: String,
}

/// Payload of `generateScript`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    /// Book content, base64 encoded
    pub final_base64: String,
    pub final_mime_type: String,
    pub custom_prompt: String,
}

/// Payload of `generateCover`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverRequest {
    pub book_title: String,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Remote(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Script generation only supports text/plain content, got {0}")]
    UnsupportedContent(String),

    #[error("API key not found in server environment")]
    MissingApiKey,

    #[error("No image generated from API")]
    NoImage,

    #[error("Invalid action provided: {0}")]
    InvalidAction(String),
}
