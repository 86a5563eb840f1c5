pub mod cloudinary;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::models::MediaType;

pub use cloudinary::CloudinaryUploader;

/// A file part pulled out of the multipart body, not yet uploaded.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn media_type(&self) -> MediaType {
        MediaType::classify(self.content_type.as_deref())
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    pub url: String,
    pub media_type: MediaType,
}

#[derive(Debug)]
pub enum UploadError {
    /// Credentials missing or the client could not be built.
    Configuration(String),
    Timeout(Duration),
    Transport(reqwest::Error),
    /// The storage service answered with a non-success status.
    Rejected { status: u16, message: String },
    InvalidResponse(String),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::Configuration(msg) => write!(f, "Upload not configured: {msg}"),
            UploadError::Timeout(limit) => {
                write!(f, "Upload timed out after {}s", limit.as_secs())
            }
            UploadError::Transport(err) => write!(f, "Upload request failed: {err}"),
            UploadError::Rejected { status, message } => {
                write!(f, "Upload rejected ({status}): {message}")
            }
            UploadError::InvalidResponse(msg) => write!(f, "Invalid upload response: {msg}"),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::Transport(err)
    }
}

/// Remote media storage. The file is moved in, so its bytes are read exactly once.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<UploadedMedia, UploadError>;
}
