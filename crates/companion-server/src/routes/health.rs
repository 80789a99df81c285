use axum::extract::State;
use axum::Json;
use companion_core::types::ProviderKind;

use crate::state::AppState;

/// GET /api/health — liveness plus database and provider status.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    let store = app.generator.store();
    let (status, database) = match store.ping().await {
        Ok(()) => ("ok", store.backend()),
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            ("degraded", "unavailable")
        }
    };
    Json(serde_json::json!({
        "status": status,
        "database": database,
        "providers": app.generator.llm().configured(),
    }))
}

/// GET /api/providers — default provider, which ones have keys, and models.
pub async fn providers(State(app): State<AppState>) -> Json<serde_json::Value> {
    let llm = app.generator.llm();
    let models: serde_json::Map<String, serde_json::Value> = ProviderKind::all()
        .iter()
        .filter_map(|k| llm.model_for(*k).map(|m| (k.to_string(), m.into())))
        .collect();
    Json(serde_json::json!({
        "default": llm.default_provider(),
        "configured": llm.configured(),
        "models": models,
    }))
}
