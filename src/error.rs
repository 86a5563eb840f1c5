use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::store::StoreError;
use crate::submission::pipeline::PipelineError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Persistence failed; `message` is what the caller sees.
    Storage { message: String, source: StoreError },
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Storage { message, source } => write!(f, "{message}: {source}"),
        }
    }
}

impl AppError {
    pub fn storage(message: &str, source: StoreError) -> Self {
        AppError::Storage {
            message: message.to_string(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Storage { message, source } => {
                tracing::error!("{message}: {source}");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = json!({ "success": false, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::BadInput(msg) => AppError::BadRequest(msg),
            PipelineError::Storage(source) => AppError::storage("Failed to save to database", source),
        }
    }
}
