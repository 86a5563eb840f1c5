use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::AppError;
use crate::models::FormSubmission;
use crate::state::SharedState;
use crate::submission::{parser, pipeline};

use super::ApiResponse;

pub async fn upload(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<FormSubmission>>, AppError> {
    let form = parser::parse_upload_form(&headers, body).await.map_err(|e| {
        tracing::debug!("Rejected upload form: {e}");
        AppError::BadRequest("Failed to parse form data".to_string())
    })?;

    let submission = pipeline::run(&state, form).await?;

    Ok(Json(ApiResponse::ok(
        submission,
        "Form submitted successfully",
    )))
}
