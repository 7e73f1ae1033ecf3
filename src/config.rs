//! Configuration management for Podcast Workshop

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::workflow::DEFAULT_MAX_UPLOAD_BYTES;

pub const DEFAULT_MODEL_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SCRIPT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub models: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the history file
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Remote generation endpoint; when unset the server calls the models itself
    pub generation_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub base_url: String,
    pub script_model: String,
    pub image_model: String,
    /// Transport timeout for every generation request, in seconds
    pub request_timeout_secs: u64,
}

impl ModelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("./data"),
            },
            models: ModelConfig {
                generation_endpoint: None,
                api_key: None,
                base_url: DEFAULT_MODEL_BASE_URL.to_string(),
                script_model: DEFAULT_SCRIPT_MODEL.to_string(),
                image_model: DEFAULT_IMAGE_MODEL.to_string(),
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT").unwrap_or(defaults.server.port),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES")
                    .unwrap_or(defaults.server.max_upload_bytes),
            },
            storage: StorageConfig {
                data_dir: env::var("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.data_dir),
            },
            models: ModelConfig {
                generation_endpoint: non_empty_var("GENERATION_ENDPOINT"),
                api_key: non_empty_var("API_KEY"),
                base_url: env::var("MODEL_BASE_URL").unwrap_or(defaults.models.base_url),
                script_model: env::var("SCRIPT_MODEL").unwrap_or(defaults.models.script_model),
                image_model: env::var("IMAGE_MODEL").unwrap_or(defaults.models.image_model),
                request_timeout_secs: parse_var("GENERATION_TIMEOUT_SECS")
                    .filter(|secs| *secs > 0)
                    .unwrap_or(defaults.models.request_timeout_secs),
            },
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "Ignoring unparsable setting");
            None
        }
    }
}
