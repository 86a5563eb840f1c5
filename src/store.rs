use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::db;
use crate::models::FormSubmission;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    Timeout(Duration),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "Database error: {err}"),
            StoreError::Timeout(limit) => {
                write!(f, "Store operation timed out after {}s", limit.as_secs())
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Persistence for form submissions. Each submission is one atomic document.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Stamp `created_at`, insert, and write the generated id back onto `submission`.
    /// On error the submission is left without an id.
    async fn save(&self, submission: &mut FormSubmission) -> Result<(), StoreError>;

    async fn list_all(&self) -> Result<Vec<FormSubmission>, StoreError>;
}

pub struct PgSubmissionStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn save(&self, submission: &mut FormSubmission) -> Result<(), StoreError> {
        let created_at = Utc::now();

        let record = tokio::time::timeout(
            self.timeout,
            db::submissions::create(&self.pool, &submission.rows, created_at),
        )
        .await
        .map_err(|_| StoreError::Timeout(self.timeout))??;

        submission.id = Some(record.id);
        submission.created_at = Some(record.created_at);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FormSubmission>, StoreError> {
        let records = tokio::time::timeout(self.timeout, db::submissions::list_all(&self.pool))
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))??;

        Ok(records.into_iter().map(FormSubmission::from).collect())
    }
}
