use std::sync::Arc;

use companion_core::config::LlmConfig;
use companion_core::types::ProviderKind;

use crate::anthropic::AnthropicClient;
use crate::error::{Attempt, LlmError};
use crate::openai::OpenAiClient;
use crate::provider::CompletionProvider;
use crate::types::{Completion, CompletionRequest};
use crate::Result;

/// Tries each configured provider once, preferred first, and returns the
/// first successful completion.
#[derive(Clone)]
pub struct FallbackClient {
    providers: Vec<Arc<dyn CompletionProvider>>,
    default: ProviderKind,
}

impl FallbackClient {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>, default: ProviderKind) -> Self {
        Self { providers, default }
    }

    /// Build one client per known provider. Providers without a key are kept
    /// so they can be reported as skipped.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let providers: Vec<Arc<dyn CompletionProvider>> = vec![
            Arc::new(AnthropicClient::new(config.anthropic.clone())?),
            Arc::new(OpenAiClient::new(config.openai.clone())?),
        ];
        Ok(Self::new(providers, config.default_provider))
    }

    pub fn default_provider(&self) -> ProviderKind {
        self.default
    }

    /// Providers that have an API key, in registration order.
    pub fn configured(&self) -> Vec<ProviderKind> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.kind())
            .collect()
    }

    /// The model a provider would use, if it is registered.
    pub fn model_for(&self, kind: ProviderKind) -> Option<&str> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.model())
    }

    /// Registered providers in attempt order: `preferred` (or the default)
    /// first, the rest in registration order.
    fn ordered(&self, preferred: Option<ProviderKind>) -> Vec<&Arc<dyn CompletionProvider>> {
        let first = preferred.unwrap_or(self.default);
        let mut out: Vec<_> = self.providers.iter().filter(|p| p.kind() == first).collect();
        out.extend(self.providers.iter().filter(|p| p.kind() != first));
        out
    }

    pub async fn complete(
        &self,
        request: &CompletionRequest,
        preferred: Option<ProviderKind>,
    ) -> Result<Completion> {
        if self.configured().is_empty() {
            return Err(LlmError::NoProviderConfigured);
        }

        let mut attempts = Vec::new();
        for provider in self.ordered(preferred) {
            let kind = provider.kind();
            if !provider.is_configured() {
                tracing::debug!(provider = %kind, "skipping provider without API key");
                attempts.push(Attempt {
                    provider: kind,
                    reason: LlmError::MissingApiKey(kind).to_string(),
                });
                continue;
            }

            match provider.complete(request).await {
                Ok(done) => {
                    if !attempts.is_empty() {
                        tracing::info!(provider = %kind, "completion served by fallback provider");
                    }
                    return Ok(done);
                }
                Err(e) => {
                    tracing::warn!(provider = %kind, error = %e, "provider failed, trying next");
                    attempts.push(Attempt {
                        provider: kind,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(LlmError::AllProvidersFailed(attempts))
    }
}
