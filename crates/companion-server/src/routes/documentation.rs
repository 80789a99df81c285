use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::generator::DocumentationRequest;
use crate::routes::{body, respond};
use crate::state::AppState;

/// POST /api/documentation/generate — generate project documentation.
pub async fn generate(
    State(app): State<AppState>,
    payload: Result<Json<DocumentationRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req = body(payload)?;
    let generated = app.generator.documentation(req).await?;
    Ok(respond(generated, "documentation"))
}
