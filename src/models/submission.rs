use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// `video/*` is a video; anything else, including a missing type, is treated as an image.
    pub fn classify(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.trim_start().to_ascii_lowercase().starts_with("video/") => {
                MediaType::Video
            }
            _ => MediaType::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRow {
    pub description: String,
    pub media: Vec<MediaFile>,
}

impl FormRow {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            media: Vec::new(),
        }
    }
}

/// A submitted form. `id` and `created_at` stay empty until the store inserts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub id: Option<Uuid>,
    pub rows: Vec<FormRow>,
    pub created_at: Option<DateTime<Utc>>,
}

impl FormSubmission {
    pub fn new(rows: Vec<FormRow>) -> Self {
        Self {
            id: None,
            rows,
            created_at: None,
        }
    }
}

/// Row shape of the `submissions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub rows: Json<Vec<FormRow>>,
    pub created_at: DateTime<Utc>,
}

impl From<SubmissionRecord> for FormSubmission {
    fn from(record: SubmissionRecord) -> Self {
        FormSubmission {
            id: Some(record.id),
            rows: record.rows.0,
            created_at: Some(record.created_at),
        }
    }
}
