use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::models::FormSubmission;
use crate::state::SharedState;

use super::ApiResponse;

pub async fn list(
    State(state): State<SharedState>,
) -> Result<Json<ApiResponse<Vec<FormSubmission>>>, AppError> {
    let submissions = state
        .store
        .list_all()
        .await
        .map_err(|e| AppError::storage("Failed to load submissions", e))?;

    Ok(Json(ApiResponse::data(submissions)))
}
