use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::{FormRow, SubmissionRecord};

pub async fn create(
    pool: &PgPool,
    rows: &[FormRow],
    created_at: DateTime<Utc>,
) -> Result<SubmissionRecord, sqlx::Error> {
    sqlx::query_as::<_, SubmissionRecord>(
        "INSERT INTO submissions (rows, created_at) VALUES ($1, $2) RETURNING id, rows, created_at",
    )
    .bind(Json(rows))
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<SubmissionRecord>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionRecord>(
        "SELECT id, rows, created_at FROM submissions ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await
}
