//! Application state management

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::generation::{GenerationClient, GenerationError, Generator, ModelProxy, ModelSettings};
use crate::history::{HistoryError, HistoryStore};
use crate::workflow::Workshop;

/// Generator shared by the workshop
pub type SharedGenerator = Arc<dyn Generator>;

/// Failure while building the application state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to load history: {0}")]
    History(#[from] HistoryError),

    #[error("Failed to build HTTP client: {0}")]
    Generation(#[from] GenerationError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    proxy: ModelProxy,
    workshop: Mutex<Workshop<SharedGenerator>>,
}

impl AppState {
    /// Create the state, loading history from the data directory.
    ///
    /// The workshop talks to `GENERATION_ENDPOINT` when one is configured and
    /// to the in-process model proxy otherwise.
    pub async fn new(config: Config) -> Result<Self, StateError> {
        let proxy = model_proxy(&config)?;
        let generator: SharedGenerator = match &config.models.generation_endpoint {
            Some(endpoint) => {
                tracing::info!(endpoint = %endpoint, "Using remote generation endpoint");
                Arc::new(GenerationClient::with_timeout(
                    endpoint,
                    config.models.request_timeout(),
                )?)
            }
            None => {
                tracing::info!(base_url = %config.models.base_url, "Calling models directly");
                Arc::new(proxy.clone())
            }
        };

        let mut history = HistoryStore::open(&config.storage.data_dir);
        let count = history.load().await?.len();
        tracing::info!(path = %history.path().display(), count, "History loaded");

        Ok(Self::with_parts(config, proxy, generator, history))
    }

    /// Assemble the state from already built parts
    pub fn with_parts(
        config: Config,
        proxy: ModelProxy,
        generator: SharedGenerator,
        history: HistoryStore,
    ) -> Self {
        let workshop =
            Workshop::new(generator, history).with_max_upload_bytes(config.server.max_upload_bytes);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                proxy,
                workshop: Mutex::new(workshop),
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the model proxy serving `/generate`
    pub fn proxy(&self) -> &ModelProxy {
        &self.inner.proxy
    }

    /// Get the workshop. Generation releases the lock while the model runs,
    /// see [`crate::workflow::run_script`]
    pub fn workshop(&self) -> &Mutex<Workshop<SharedGenerator>> {
        &self.inner.workshop
    }
}

/// Model proxy built from the model settings
pub fn model_proxy(config: &Config) -> Result<ModelProxy, GenerationError> {
    ModelProxy::new(ModelSettings {
        api_key: config.models.api_key.clone(),
        base_url: config.models.base_url.clone(),
        script_model: config.models.script_model.clone(),
        image_model: config.models.image_model.clone(),
        request_timeout: config.models.request_timeout(),
    })
}
