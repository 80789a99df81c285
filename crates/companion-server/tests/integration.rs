use std::sync::Arc;

use axum::http::StatusCode;
use companion_core::config::Config;
use companion_core::types::ArtifactKind;
use companion_llm::FallbackClient;
use companion_server::store::{ArtifactStore, MemoryStore};
use companion_server::{build_router, AppState};
use http_body_util::BodyExt;
use mockito::Matcher;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Config pointing Anthropic at `anthropic_url` with a key, and OpenAI at
/// `openai_url` with a key only when `openai_key` is set.
fn config(anthropic_url: &str, openai_url: &str, openai_key: bool) -> Config {
    let mut cfg = Config::default();
    cfg.llm.anthropic.api_key = Some("sk-ant-test".into());
    cfg.llm.anthropic.base_url = anthropic_url.to_string();
    cfg.llm.anthropic.model = "claude-test".into();
    cfg.llm.openai.base_url = openai_url.to_string();
    cfg.llm.openai.model = "gpt-test".into();
    if openai_key {
        cfg.llm.openai.api_key = Some("sk-oai-test".into());
    }
    cfg
}

fn app_with(cfg: Config, store: Arc<MemoryStore>) -> axum::Router {
    let llm = FallbackClient::from_config(&cfg.llm).unwrap();
    build_router(AppState::new(cfg, llm, store))
}

fn anthropic_reply(text: &str) -> String {
    serde_json::json!({
        "model": "claude-test",
        "content": [{ "type": "text", "text": text }],
        "usage": { "input_tokens": 10, "output_tokens": 20 }
    })
    .to_string()
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Status routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_memory_store_and_providers() {
    let app = app_with(
        config("http://127.0.0.1:9", "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = get(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "memory");
    assert_eq!(json["providers"], serde_json::json!(["anthropic"]));
}

#[tokio::test]
async fn providers_lists_default_and_models() {
    let app = app_with(
        config("http://127.0.0.1:9", "http://127.0.0.1:9", true),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = get(app, "/api/providers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["default"], "anthropic");
    assert_eq!(json["configured"], serde_json::json!(["anthropic", "openai"]));
    assert_eq!(json["models"]["openai"], "gpt-test");
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[tokio::test]
async fn specification_is_generated_and_stored() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::Regex("Payments API".into()))
        .with_status(200)
        .with_body(anthropic_reply("```markdown\n# Payments API\n\n## Introduction\n```"))
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let app = app_with(config(&server.url(), "http://127.0.0.1:9", false), store.clone());
    let (status, json) = post_json(
        app,
        "/api/specifications/generate",
        serde_json::json!({
            "title": "Payments API",
            "description": "Accept card payments",
            "requirements": ["PCI compliant"],
            "projectId": "not-a-uuid"
        }),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["specification"], "# Payments API\n\n## Introduction");
    assert_eq!(json["provider"], "anthropic");
    assert_eq!(json["model"], "claude-test");

    let id: uuid::Uuid = json["id"].as_str().unwrap().parse().unwrap();
    let row = store
        .fetch(ArtifactKind::Specification, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.title, "Payments API");
    assert!(row.project_id.is_none());
}

#[tokio::test]
async fn specification_without_title_is_400_without_llm_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .expect(0)
        .create_async()
        .await;

    let app = app_with(
        config(&server.url(), "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/specifications/generate",
        serde_json::json!({ "description": "no title" }),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = app_with(
        config("http://127.0.0.1:9", "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/code/generate")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn design_uses_stored_specification_and_repairs_diagrams() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::Regex("Orders must be idempotent".into()))
        .with_status(200)
        .with_body(anthropic_reply(
            "## Architecture\n\n```mermaid\nA[Start (now)] --> B\n```\n",
        ))
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let spec = companion_core::record::NewArtifact::new(
        ArtifactKind::Specification,
        "Orders",
        "Orders must be idempotent.",
        "anthropic",
        "claude-test",
    );
    let spec_id = store.insert(spec).await.unwrap();

    let app = app_with(config(&server.url(), "http://127.0.0.1:9", false), store.clone());
    let (status, json) = post_json(
        app,
        "/api/designs/generate",
        serde_json::json!({
            "specificationId": spec_id.to_string(),
            "diagramTypes": ["flowchart"]
        }),
    )
    .await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    let diagram = &json["diagrams"][0];
    assert_eq!(diagram["diagramType"], "flowchart");
    assert_eq!(diagram["changed"], true);
    assert_eq!(diagram["diagram"], "flowchart TD\nA[\"Start (now)\"] --> B");
    assert!(json["design"]
        .as_str()
        .unwrap()
        .contains("A[\"Start (now)\"] --> B"));

    let id: uuid::Uuid = json["id"].as_str().unwrap().parse().unwrap();
    let row = store.fetch(ArtifactKind::Design, id).await.unwrap().unwrap();
    assert_eq!(row.specification_id, Some(spec_id));
    assert_eq!(row.title, "Design: Orders");
}

#[tokio::test]
async fn design_with_unknown_specification_is_404() {
    let app = app_with(
        config("http://127.0.0.1:9", "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/designs/generate",
        serde_json::json!({ "specificationId": uuid::Uuid::new_v4().to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn code_extracts_block_and_suggests_file_name() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(anthropic_reply(
            "Here is the code:\n```python\ndef add(a, b):\n    return a + b\n```\nEnjoy.",
        ))
        .create_async()
        .await;

    let app = app_with(
        config(&server.url(), "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/code/generate",
        serde_json::json!({ "language": "python", "requirements": "add two numbers" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], "def add(a, b):\n    return a + b");
    assert_eq!(json["fileName"], "app.py");
}

#[tokio::test]
async fn code_without_any_source_is_400() {
    let app = app_with(
        config("http://127.0.0.1:9", "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, _) = post_json(
        app,
        "/api/code/generate",
        serde_json::json!({ "language": "go" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tests_route_names_file_after_source() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(anthropic_reply("```python\ndef test_add():\n    assert add(1, 2) == 3\n```"))
        .create_async()
        .await;

    let app = app_with(
        config(&server.url(), "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/tests/generate",
        serde_json::json!({
            "code": "def add(a, b): return a + b",
            "fileName": "src/calc.py",
            "language": "python",
            "framework": "pytest"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fileName"], "test_calc.py");
    assert!(json["code"].as_str().unwrap().starts_with("def test_add"));
}

#[tokio::test]
async fn pipeline_returns_config_path() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(anthropic_reply("```yaml\nname: CI\non: [push]\n```"))
        .create_async()
        .await;

    let app = app_with(
        config(&server.url(), "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/pipelines/generate",
        serde_json::json!({ "platform": "github-actions", "language": "rust" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pipeline"], "name: CI\non: [push]");
    assert_eq!(json["path"], ".github/workflows/ci.yml");
}

#[tokio::test]
async fn pipeline_with_unknown_platform_is_400() {
    let app = app_with(
        config("http://127.0.0.1:9", "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/pipelines/generate",
        serde_json::json!({ "platform": "travis", "language": "rust" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("travis"));
}

#[tokio::test]
async fn documentation_is_generated() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::Regex("README".into()))
        .with_status(200)
        .with_body(anthropic_reply("# Widget\n\nA widget."))
        .create_async()
        .await;

    let app = app_with(
        config(&server.url(), "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/documentation/generate",
        serde_json::json!({ "docType": "readme", "projectName": "Widget" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["documentation"], "# Widget\n\nA widget.");
}

// ---------------------------------------------------------------------------
// Provider fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_preferred_provider_falls_back() {
    let mut anthropic = mockito::Server::new_async().await;
    let mut openai = mockito::Server::new_async().await;
    let _down = anthropic
        .mock("POST", "/v1/messages")
        .with_status(500)
        .create_async()
        .await;
    let up = openai
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r##"{"model":"gpt-test","choices":[{"message":{"content":"# Spec"}}]}"##)
        .expect(1)
        .create_async()
        .await;

    let app = app_with(
        config(&anthropic.url(), &openai.url(), true),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/specifications/generate",
        serde_json::json!({ "title": "T", "description": "D" }),
    )
    .await;

    up.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["provider"], "openai");
    assert_eq!(json["specification"], "# Spec");
}

#[tokio::test]
async fn all_providers_failing_is_502() {
    let mut server = mockito::Server::new_async().await;
    let _down = server
        .mock("POST", "/v1/messages")
        .with_status(503)
        .create_async()
        .await;

    let app = app_with(
        config(&server.url(), "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/specifications/generate",
        serde_json::json!({ "title": "T", "description": "D" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("all providers failed"));
}

#[tokio::test]
async fn no_configured_provider_is_503() {
    let mut cfg = config("http://127.0.0.1:9", "http://127.0.0.1:9", false);
    cfg.llm.anthropic.api_key = None;
    let app = app_with(cfg, Arc::new(MemoryStore::new()));
    let (status, _) = post_json(
        app,
        "/api/specifications/generate",
        serde_json::json!({ "title": "T", "description": "D" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ---------------------------------------------------------------------------
// Mermaid
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mermaid_repair_route() {
    let app = app_with(
        config("http://127.0.0.1:9", "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, json) = post_json(
        app,
        "/api/mermaid/repair",
        serde_json::json!({ "diagram": "classDiagram\nclass Cart\n{\n  +items\n}" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["diagram"], "classDiagram\nclass Cart {\n  +items\n}");
    assert_eq!(json["diagramType"], "class");
    assert_eq!(json["changed"], true);
}

#[tokio::test]
async fn mermaid_repair_rejects_empty_diagram() {
    let app = app_with(
        config("http://127.0.0.1:9", "http://127.0.0.1:9", false),
        Arc::new(MemoryStore::new()),
    );
    let (status, _) = post_json(
        app,
        "/api/mermaid/repair",
        serde_json::json!({ "diagram": "   " }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
