use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::generator::SpecificationRequest;
use crate::routes::{body, respond};
use crate::state::AppState;

/// POST /api/specifications/generate — generate a specification from a title and description.
pub async fn generate(
    State(app): State<AppState>,
    payload: Result<Json<SpecificationRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req = body(payload)?;
    let generated = app.generator.specification(req).await?;
    Ok(respond(generated, "specification"))
}
