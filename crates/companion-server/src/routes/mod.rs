pub mod code;
pub mod designs;
pub mod documentation;
pub mod health;
pub mod mermaid;
pub mod pipelines;
pub mod specifications;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::generator::Generated;

/// Unwrap a JSON body, turning extractor rejections into the API's 400 shape.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| AppError::bad_request(e.body_text()))
}

/// Flatten a generated artifact into the response object, storing the
/// content under `content_key`.
pub(crate) fn respond(generated: Generated, content_key: &str) -> Json<Value> {
    let mut out = Map::new();
    out.insert("success".into(), Value::Bool(true));
    if let Some(id) = generated.id {
        out.insert("id".into(), Value::String(id.to_string()));
    }
    out.insert(content_key.into(), Value::String(generated.content));
    out.insert(
        "provider".into(),
        Value::String(generated.provider.as_str().to_string()),
    );
    out.insert("model".into(), Value::String(generated.model));
    out.extend(generated.extra);
    Json(Value::Object(out))
}
