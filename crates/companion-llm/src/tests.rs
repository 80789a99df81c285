//! End-to-end fallback against two mocked provider endpoints.

use companion_core::config::LlmConfig;
use companion_core::types::ProviderKind;

use crate::{CompletionRequest, FallbackClient, LlmError};

fn config(anthropic_url: String, openai_url: String) -> LlmConfig {
    let mut cfg = LlmConfig::default();
    cfg.anthropic.api_key = Some("sk-ant".into());
    cfg.anthropic.base_url = anthropic_url;
    cfg.openai.api_key = Some("sk-oai".into());
    cfg.openai.base_url = openai_url;
    cfg
}

#[tokio::test]
async fn anthropic_outage_falls_back_to_openai() {
    let mut anthropic = mockito::Server::new_async().await;
    let mut openai = mockito::Server::new_async().await;

    let down = anthropic
        .mock("POST", "/v1/messages")
        .with_status(503)
        .with_body("service unavailable")
        .expect(1)
        .create_async()
        .await;
    let up = openai
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"fallback answer"}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let client = FallbackClient::from_config(&config(anthropic.url(), openai.url())).unwrap();
    let done = client
        .complete(&CompletionRequest::new("go", 32, 0.0), None)
        .await
        .unwrap();

    down.assert_async().await;
    up.assert_async().await;
    assert_eq!(done.provider, ProviderKind::OpenAi);
    assert_eq!(done.text, "fallback answer");
    assert_eq!(done.model, "gpt-4o");
}

#[tokio::test]
async fn both_down_reports_each_status() {
    let mut anthropic = mockito::Server::new_async().await;
    let mut openai = mockito::Server::new_async().await;

    let _a = anthropic
        .mock("POST", "/v1/messages")
        .with_status(500)
        .create_async()
        .await;
    let _o = openai
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let client = FallbackClient::from_config(&config(anthropic.url(), openai.url())).unwrap();
    let err = client
        .complete(&CompletionRequest::new("go", 32, 0.0), Some(ProviderKind::OpenAi))
        .await
        .unwrap_err();

    let LlmError::AllProvidersFailed(attempts) = err else {
        panic!("expected AllProvidersFailed");
    };
    assert_eq!(attempts[0].provider, ProviderKind::OpenAi);
    assert!(attempts[0].reason.contains("429"));
    assert_eq!(attempts[1].provider, ProviderKind::Anthropic);
    assert!(attempts[1].reason.contains("500"));
}
