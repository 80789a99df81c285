use async_trait::async_trait;
use companion_core::config::ProviderConfig;
use companion_core::types::ProviderKind;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{api_key, check_response, http_client, CompletionProvider};
use crate::types::{Completion, CompletionRequest, Usage};
use crate::Result;

// ─── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

// ─── Client ───────────────────────────────────────────────────────────────

/// Client for OpenAI-compatible chat completion endpoints.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(&config)?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages,
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
            .bearer_auth(key)
            .json(&body)
            .send()
            .await;
        let response = check_response(provider, sent).await?;

        let parsed: ChatResponse = response.json().await.map_err(|e| LlmError::Parse {
            provider,
            message: e.to_string(),
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse(provider));
        }

        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
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
