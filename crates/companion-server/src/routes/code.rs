use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::generator::CodeRequest;
use crate::routes::{body, respond};
use crate::state::AppState;

/// POST /api/code/generate — generate source code from a specification and/or design.
pub async fn generate(
    State(app): State<AppState>,
    payload: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req = body(payload)?;
    let generated = app.generator.code(req).await?;
    Ok(respond(generated, "code"))
}
