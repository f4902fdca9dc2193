use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::composer::PromptComposer;
use crate::core::config::Settings;
use crate::llm::{LlmProvider, OpenAiProvider};

/// Shared application state. All fields are cheap to clone or shared;
/// nothing here is mutated after startup, so concurrent requests never
/// contend.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub http: Client,
    pub llm: Arc<dyn LlmProvider>,
    pub embedder: Arc<dyn LlmProvider>,
    pub composer: PromptComposer,
}

impl AppState {
    /// Builds state from explicit parts. Tests inject stub providers here.
    pub fn new(
        settings: Settings,
        http: Client,
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn LlmProvider>,
    ) -> Arc<Self> {
        let composer = PromptComposer::new(http.clone(), settings.composer_base_url.clone());
        Arc::new(Self {
            settings,
            http,
            llm,
            embedder,
            composer,
        })
    }

    /// Builds state from the environment. Every outbound call shares one
    /// client with a bounded timeout, so an unresponsive collaborator
    /// cannot stall a request indefinitely.
    pub fn initialize() -> anyhow::Result<Arc<Self>> {
        let settings = Settings::from_env();

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        let llm = Arc::new(OpenAiProvider::new(
            http.clone(),
            settings.chat_base_url.clone(),
            settings.chat_api_key.clone(),
        ));
        let embedder = Arc::new(OpenAiProvider::new(
            http.clone(),
            settings.embedding_base_url.clone(),
            settings.embedding_api_key.clone(),
        ));

        Ok(Self::new(settings, http, llm, embedder))
    }
}
