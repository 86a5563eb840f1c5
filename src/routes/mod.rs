pub mod health;
pub mod submissions;
pub mod upload;

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::state::SharedState;

/// Envelope for every JSON answer of the API.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/upload", post(upload::upload))
        .route("/api/submissions", get(submissions::list))
        .route("/api/health", get(health::health))
}
