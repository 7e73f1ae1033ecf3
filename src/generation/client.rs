//! Remote generation client
//!
//! Sends `{action, payload}` requests to a generation endpoint that proxies
//! the hosted models. The endpoint holds the model credentials.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    CoverRequest, GenerationError, PodcastContent, RpcEnvelope, ScriptRequest,
    ACTION_GENERATE_COVER, ACTION_GENERATE_SCRIPT,
};
use super::Generator;

const FALLBACK_ERROR: &str = "Generation endpoint call failed, check the server logs";

/// HTTP client for a generation endpoint
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GenerationClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Client with a transport-level timeout
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<P, R>(&self, action: &str, payload: &P) -> Result<R, GenerationError>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let envelope = RpcEnvelope {
            action: action.to_string(),
            payload: serde_json::to_value(payload)
                .map_err(|e| GenerationError::InvalidPayload(e.to_string()))?,
        };

        tracing::debug!(action, endpoint = %self.endpoint, "Calling generation endpoint");
        let response = self.http.post(&self.endpoint).json(&envelope).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Gateways in front of the endpoint may answer with HTML
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| value.get("error")?.as_str().map(str::to_string))
                .unwrap_or_else(|| FALLBACK_ERROR.to_string());
            tracing::warn!(action, %status, error = %message, "Generation endpoint returned an error");
            return Err(GenerationError::Remote(message));
        }

        serde_json::from_str(&body).map_err(|e| GenerationError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Generator for GenerationClient {
    async fn generate_script(&self, request: ScriptRequest) -> Result<PodcastContent, GenerationError> {
        self.call(ACTION_GENERATE_SCRIPT, &request).await
    }

    async fn generate_cover(&self, book_title: &str) -> Result<String, GenerationError> {
        let request = CoverRequest {
            book_title: book_title.to_string(),
        };
        self.call(ACTION_GENERATE_COVER, &request).await
    }
}
