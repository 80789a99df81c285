use axum::extract::rejection::JsonRejection;
use axum::Json;
use companion_core::mermaid::{self, Repaired};
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::body;

#[derive(Debug, Deserialize)]
pub struct RepairRequest {
    #[serde(default)]
    pub diagram: String,
}

/// POST /api/mermaid/repair — repair a single diagram without calling a model.
pub async fn repair(
    payload: Result<Json<RepairRequest>, JsonRejection>,
) -> Result<Json<Repaired>, AppError> {
    let req = body(payload)?;
    if req.diagram.trim().is_empty() {
        return Err(AppError::bad_request("diagram is empty"));
    }
    Ok(Json(mermaid::repair(&req.diagram)))
}
