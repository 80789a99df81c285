use companion_core::types::ProviderKind;
use serde::Serialize;
use thiserror::Error;

/// One failed or skipped provider during a fallback pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub provider: ProviderKind,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0} API key is not configured")]
    MissingApiKey(ProviderKind),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {provider} failed: {source}")]
    Http {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API returned {status}: {body}")]
    Api {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("failed to parse {provider} response: {message}")]
    Parse {
        provider: ProviderKind,
        message: String,
    },

    #[error("{0} returned an empty completion")]
    EmptyResponse(ProviderKind),

    #[error("no LLM provider is configured")]
    NoProviderConfigured,

    #[error("all providers failed: {}", summarize(.0))]
    AllProvidersFailed(Vec<Attempt>),
}

fn summarize(attempts: &[Attempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.provider, a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Clip an upstream error body so a huge HTML error page does not end up in
/// logs or responses verbatim.
pub(crate) fn clip(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
