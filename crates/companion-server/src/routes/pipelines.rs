use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::generator::PipelineRequest;
use crate::routes::{body, respond};
use crate::state::AppState;

/// POST /api/pipelines/generate — generate a CI/CD pipeline definition.
pub async fn generate(
    State(app): State<AppState>,
    payload: Result<Json<PipelineRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req = body(payload)?;
    let generated = app.generator.pipeline(req).await?;
    Ok(respond(generated, "pipeline"))
}
