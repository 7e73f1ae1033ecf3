//! Script and cover generation
//!
//! Two backends implement [`Generator`]: [`GenerationClient`] forwards the
//! `{action, payload}` RPC to a remote endpoint, and [`ModelProxy`] calls the
//! hosted models directly with the server's API key.

mod client;
mod proxy;
mod script;
mod types;

use async_trait::async_trait;

pub use client::GenerationClient;
pub use proxy::{cover_prompt, ModelProxy, ModelSettings};
pub use script::{prepare_script_request, PreparedScript, DEFAULT_SCRIPT_PROMPT, SAFETY_THRESHOLD};
pub use types::{
    CoverRequest, GenerationError, PodcastContent, RpcEnvelope, RpcError, ScriptRequest,
    ACTION_GENERATE_COVER, ACTION_GENERATE_SCRIPT,
};

/// Produces podcast scripts and cover images
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a script from base64 book content and a prompt
    async fn generate_script(&self, request: ScriptRequest) -> Result<PodcastContent, GenerationError>;

    /// Generate a square cover image, returned as a data URL
    async fn generate_cover(&self, book_title: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for std::sync::Arc<G> {
    async fn generate_script(&self, request: ScriptRequest) -> Result<PodcastContent, GenerationError> {
        (**self).generate_script(request).await
    }

    async fn generate_cover(&self, book_title: &str) -> Result<String, GenerationError> {
        (**self).generate_cover(book_title).await
    }
}
