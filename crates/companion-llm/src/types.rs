use companion_core::prompt::Prompt;
use companion_core::types::ProviderKind;
use serde::{Deserialize, Serialize};

// ─── Request ──────────────────────────────────────────────────────────────

/// A single-turn completion request, independent of provider wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens,
            temperature,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        let system = system.into();
        self.system = if system.trim().is_empty() {
            None
        } else {
            Some(system)
        };
        self
    }

    pub fn from_prompt(prompt: Prompt, max_tokens: u32, temperature: f32) -> Self {
        Self::new(prompt.user, max_tokens, temperature).with_system(prompt.system)
    }
}

// ─── Response ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// The text a provider produced and who produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub text: String,
    pub provider: ProviderKind,
    pub model: String,
    pub usage: Usage,
}
