use std::sync::Arc;

use companion_core::config::Config;
use companion_llm::FallbackClient;

use crate::generator::Generator;
use crate::store::{self, ArtifactStore};

/// Shared application state passed to all route handlers. Immutable after
/// startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Generator,
}

impl AppState {
    pub fn new(config: Config, llm: FallbackClient, store: Arc<dyn ArtifactStore>) -> Self {
        let config = Arc::new(config);
        Self {
            generator: Generator::new(llm, store, config.clone()),
            config,
        }
    }

    /// Build clients and connect the store described by `config`.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let llm = FallbackClient::from_config(&config.llm)?;
        let store = store::connect(&config.database).await?;
        Ok(Self::new(config, llm, store))
    }
}
