use async_trait::async_trait;
use companion_core::config::ProviderConfig;
use companion_core::types::ProviderKind;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{api_key, check_response, http_client, CompletionProvider};
use crate::types::{Completion, CompletionRequest, Usage};
use crate::Result;

const ANTHROPIC_VERSION: &str = "2023-06-01";

// ─── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}

// ─── Client ───────────────────────────────────────────────────────────────

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl AnthropicClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(&config)?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        self.config.has_key()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let provider = self.kind();
        let key = api_key(&self.config, provider)?;

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: vec![WireMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        tracing::info!(
            %provider,
            model = %self.config.model,
            max_tokens = request.max_tokens,
            "sending completion request"
        );

        let sent = self
            .http
            .post(self.endpoint())
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await;
        let response = check_response(provider, sent).await?;

        let parsed: MessagesResponse = response.json().await.map_err(|e| LlmError::Parse {
            provider,
            message: e.to_string(),
        })?;

        let text = parsed
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse(provider));
        }

        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            })
            .unwrap_or_default();

        Ok(Completion {
            text,
            provider,
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
            usage,
        })
    }
}
