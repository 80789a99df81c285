use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use companion_core::CompanionError;
use companion_llm::LlmError;

use crate::store::StoreError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(CompanionError::InvalidInput(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if let Some(e) = self.0.downcast_ref::<CompanionError>() {
            return match e {
                CompanionError::InvalidInput(_)
                | CompanionError::MissingField(_)
                | CompanionError::UnknownArtifactKind(_)
                | CompanionError::UnknownProvider(_)
                | CompanionError::UnknownPlatform(_)
                | CompanionError::UnknownDocType(_)
                | CompanionError::Json(_) => StatusCode::BAD_REQUEST,
                CompanionError::ArtifactNotFound { .. } => StatusCode::NOT_FOUND,
                CompanionError::ConfigNotFound(_)
                | CompanionError::Io(_)
                | CompanionError::Yaml(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        if let Some(e) = self.0.downcast_ref::<LlmError>() {
            return match e {
                LlmError::NoProviderConfigured | LlmError::MissingApiKey(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                LlmError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
                LlmError::Http { .. }
                | LlmError::Api { .. }
                | LlmError::Parse { .. }
                | LlmError::EmptyResponse(_)
                | LlmError::AllProvidersFailed(_) => StatusCode::BAD_GATEWAY,
            };
        }
        if self.0.downcast_ref::<StoreError>().is_some() {
            return StatusCode::SERVICE_UNAVAILABLE;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {:#}", self.0);
        }
        let body = serde_json::json!({ "success": false, "error": format!("{:#}", self.0) });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
