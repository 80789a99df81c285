use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::generator::DesignRequest;
use crate::routes::{body, respond};
use crate::state::AppState;

/// POST /api/designs/generate — generate a design document with repaired Mermaid diagrams.
pub async fn generate(
    State(app): State<AppState>,
    payload: Result<Json<DesignRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req = body(payload)?;
    let generated = app.generator.design(req).await?;
    Ok(respond(generated, "design"))
}
