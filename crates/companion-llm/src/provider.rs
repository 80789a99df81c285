use async_trait::async_trait;
use companion_core::config::ProviderConfig;
use companion_core::types::ProviderKind;
use std::time::Duration;

use crate::error::{clip, LlmError};
use crate::types::{Completion, CompletionRequest};
use crate::Result;

/// A hosted model API that can complete a single prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// `false` when the provider has no API key and should be skipped.
    fn is_configured(&self) -> bool;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

/// Build the shared HTTP client for a provider.
pub(crate) fn http_client(cfg: &ProviderConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(10));
    if cfg.timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(cfg.timeout_secs));
    }
    builder.build().map_err(LlmError::Client)
}

/// The key for `provider`, or `MissingApiKey` if blank.
pub(crate) fn api_key(cfg: &ProviderConfig, provider: ProviderKind) -> Result<&str> {
    cfg.api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(LlmError::MissingApiKey(provider))
}

/// Turn a transport failure or non-2xx status into an `LlmError`, returning
/// the response for decoding otherwise.
pub(crate) async fn check_response(
    provider: ProviderKind,
    sent: std::result::Result<reqwest::Response, reqwest::Error>,
) -> Result<reqwest::Response> {
    let response = sent.map_err(|e| {
        if e.is_timeout() {
            tracing::error!(%provider, "request timed out");
        } else if e.is_connect() {
            tracing::error!(%provider, "connection failed: {e}");
        }
        LlmError::Http {
            provider,
            source: e,
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    tracing::error!(%provider, status = status.as_u16(), "provider returned error");
    Err(LlmError::Api {
        provider,
        status: status.as_u16(),
        body: clip(&body, 500),
    })
}
