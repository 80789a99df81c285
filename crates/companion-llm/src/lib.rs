//! `companion-llm` — completion clients for the hosted model APIs used by
//! SDLC Companion, plus the provider fallback policy.
//!
//! # Architecture
//!
//! ```text
//! CompletionRequest
//!     │
//!     ▼
//! FallbackClient  ← preferred provider first, then the others, once each
//!     │
//!     ├─► AnthropicClient   POST {base}/v1/messages
//!     └─► OpenAiClient      POST {base}/v1/chat/completions
//!     │
//!     ▼
//! Completion      ← text + which provider/model actually served it
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use companion_llm::{CompletionRequest, FallbackClient};
//!
//! let client = FallbackClient::from_config(&config.llm)?;
//! let req = CompletionRequest::new("Summarise this spec", 1024, 0.2);
//! let done = client.complete(&req, None).await?;
//! println!("{} answered: {}", done.provider, done.text);
//! ```

pub mod anthropic;
pub mod error;
pub mod fallback;
pub mod openai;
pub mod provider;
pub mod types;

#[cfg(test)]
mod tests;

pub use anthropic::AnthropicClient;
pub use error::{Attempt, LlmError};
pub use fallback::FallbackClient;
pub use openai::OpenAiClient;
pub use provider::CompletionProvider;
pub use types::{Completion, CompletionRequest, Usage};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, LlmError>;
