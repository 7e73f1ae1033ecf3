//! Server-side model proxy
//!
//! Handles the `{action, payload}` RPC by calling an OpenAI-compatible API
//! with the server's key. The key never leaves this process.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use super::types::{
    CoverRequest, GenerationError, PodcastContent, RpcEnvelope, ScriptRequest,
    ACTION_GENERATE_COVER, ACTION_GENERATE_SCRIPT,
};
use super::Generator;

const SCRIPT_SYSTEM_PROMPT: &str = "You are a professional podcast script writing assistant. \
Based on the book content and the requirements provided by the user, produce a JSON object \
containing a title (title), an introduction (intro) and the complete script (script). \
Follow the JSON format strictly.";

/// Connection settings for the hosted models
#[derive(Clone)]
pub struct ModelSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub script_model: String,
    pub image_model: String,
    /// Transport timeout per model request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("script_model", &self.script_model)
            .field("image_model", &self.image_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Generation backend that talks to the hosted models directly
#[derive(Debug, Clone)]
pub struct ModelProxy {
    http: reqwest::Client,
    settings: ModelSettings,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
}

impl ModelProxy {
    pub fn new(settings: ModelSettings) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { http, settings })
    }

    /// Dispatch one RPC envelope, returning the JSON result body
    pub async fn handle(&self, envelope: RpcEnvelope) -> Result<serde_json::Value, GenerationError> {
        match envelope.action.as_str() {
            ACTION_GENERATE_SCRIPT => {
                let request: ScriptRequest = parse_payload(envelope.payload)?;
                let content = self.generate_script(request).await?;
                serde_json::to_value(content).map_err(|e| GenerationError::InvalidResponse(e.to_string()))
            }
            ACTION_GENERATE_COVER => {
                let request: CoverRequest = parse_payload(envelope.payload)?;
                let url = self.generate_cover(&request.book_title).await?;
                Ok(serde_json::Value::String(url))
            }
            other => Err(GenerationError::InvalidAction(other.to_string())),
        }
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.settings
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(GenerationError::MissingApiKey)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, GenerationError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, url = %url, "Model API returned an error");
            return Err(GenerationError::Remote(format!(
                "Model API returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Generator for ModelProxy {
    async fn generate_script(&self, request: ScriptRequest) -> Result<PodcastContent, GenerationError> {
        if request.final_mime_type != "text/plain" {
            return Err(GenerationError::UnsupportedContent(request.final_mime_type));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(request.final_base64.trim())
            .map_err(|e| GenerationError::InvalidPayload(e.to_string()))?;
        let text = String::from_utf8_lossy(&bytes);
        let user_message = format!(
            "Book content:\n\n---\n{}\n---\n\nRequirements: {}",
            text, request.custom_prompt
        );

        let body = json!({
            "model": self.settings.script_model,
            "messages": [
                { "role": "system", "content": SCRIPT_SYSTEM_PROMPT },
                { "role": "user", "content": user_message },
            ],
            "response_format": { "type": "json_object" },
        });

        tracing::info!(
            model = %self.settings.script_model,
            chars = text.chars().count(),
            "Requesting podcast script"
        );
        let completion: ChatCompletion = self.post_json("chat/completions", body).await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::InvalidResponse("empty completion".to_string()))?;

        serde_json::from_str(&content).map_err(|e| GenerationError::InvalidResponse(e.to_string()))
    }

    async fn generate_cover(&self, book_title: &str) -> Result<String, GenerationError> {
        let body = json!({
            "model": self.settings.image_model,
            "prompt": cover_prompt(book_title),
            "n": 1,
            "size": "1024x1024",
            "response_format": "b64_json",
        });

        tracing::info!(model = %self.settings.image_model, book_title, "Requesting cover image");
        let images: ImagesResponse = self.post_json("images/generations", body).await?;

        let b64 = images
            .data
            .into_iter()
            .next()
            .and_then(|image| image.b64_json)
            .filter(|b64| !b64.is_empty())
            .ok_or(GenerationError::NoImage)?;

        Ok(format!("data:image/png;base64,{b64}"))
    }
}

fn parse_payload<T: for<'de> Deserialize<'de>>(payload: serde_json::Value) -> Result<T, GenerationError> {
    serde_json::from_value(payload).map_err(|e| GenerationError::InvalidPayload(e.to_string()))
}

/// Image prompt for a text-free square cover
pub fn cover_prompt(book_title: &str) -> String {
    format!(
        "Design a high-quality, artistic, square podcast cover for a book episode about \"{book_title}\". \
         The style should be abstract, emotional, and visually striking. Important: Do NOT include any \
         text or characters on the image. Focus on visual storytelling and symbolism related to the \
         book's theme."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    fn settings(api_key: Option<&str>, base_url: &str) -> ModelSettings {
        ModelSettings {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            script_model: "script-model".to_string(),
            image_model: "image-model".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    async fn spawn_models() -> String {
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(|Json(body): Json<serde_json::Value>| async move {
                    let user = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();
                    let content = json!({
                        "title": body["model"],
                        "intro": body["response_format"]["type"],
                        "script": user,
                    });
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": content.to_string()}}]
                    }))
                }),
            )
            .route(
                "/v1/images/generations",
                post(|| async { Json(json!({"data": [{"b64_json": "iVBORw0KGgo="}]})) }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/")
    }

    fn envelope(action: &str, payload: serde_json::Value) -> RpcEnvelope {
        RpcEnvelope {
            action: action.to_string(),
            payload,
        }
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let proxy = ModelProxy::new(settings(Some("key"), "http://unused")).unwrap();
        let err = proxy.handle(envelope("summarize", json!({}))).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid action provided: summarize");
    }

    #[tokio::test]
    async fn test_script_requires_plain_text() {
        let proxy = ModelProxy::new(settings(Some("key"), "http://unused")).unwrap();
        let payload = json!({"finalBase64": "JVBERi0=", "finalMimeType": "application/pdf", "customPrompt": ""});
        let err = proxy
            .handle(envelope(ACTION_GENERATE_SCRIPT, payload))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedContent(ref m) if m == "application/pdf"));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let proxy = ModelProxy::new(settings(None, "http://unused")).unwrap();
        let err = proxy
            .handle(envelope(ACTION_GENERATE_COVER, json!({"bookTitle": "Walden"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_invalid_payload() {
        let proxy = ModelProxy::new(settings(Some("key"), "http://unused")).unwrap();
        let err = proxy
            .handle(envelope(ACTION_GENERATE_COVER, json!({"title": "wrong field"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_script_through_chat_completion() {
        let base_url = spawn_models().await;
        let proxy = ModelProxy::new(settings(Some("key"), &base_url)).unwrap();
        let payload = json!({
            "finalBase64": base64::engine::general_purpose::STANDARD.encode("Call me Ishmael."),
            "finalMimeType": "text/plain",
            "customPrompt": "One hour",
        });

        let value = proxy
            .handle(envelope(ACTION_GENERATE_SCRIPT, payload))
            .await
            .unwrap();
        let content: PodcastContent = serde_json::from_value(value).unwrap();

        assert_eq!(content.title, "script-model");
        assert_eq!(content.intro, "json_object");
        assert!(content.script.contains("Call me Ishmael."));
        assert!(content.script.ends_with("Requirements: One hour"));
    }

    #[tokio::test]
    async fn test_cover_through_image_generation() {
        let base_url = spawn_models().await;
        let proxy = ModelProxy::new(settings(Some("key"), &base_url)).unwrap();

        let url = proxy.generate_cover("Walden").await.unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_cover_prompt_mentions_title() {
        let prompt = cover_prompt("Walden");
        assert!(prompt.contains("\"Walden\""));
        assert!(prompt.contains("Do NOT include any text"));
    }

    #[tokio::test]
    async fn test_stalled_model_api_times_out() {
        let app = Router::new().route(
            "/v1/images/generations",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(json!({"data": []}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut stalled = settings(Some("key"), &format!("http://{addr}/v1"));
        stalled.request_timeout = Duration::from_millis(200);
        let proxy = ModelProxy::new(stalled).unwrap();

        let err = proxy.generate_cover("Walden").await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(ref e) if e.is_timeout()));
    }
}
