use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use form_builder::config::{Config, UploadSettings};
use form_builder::media::{MediaUploader, UploadError, UploadFile, UploadedMedia};
use form_builder::models::FormSubmission;
use form_builder::store::{StoreError, SubmissionStore};

/// Keeps submissions in memory. Can be switched to fail every write.
#[derive(Default)]
pub struct MemoryStore {
    pub saved: Mutex<Vec<FormSubmission>>,
    pub save_attempts: AtomicUsize,
    pub fail_saves: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn save(&self, submission: &mut FormSubmission) -> Result<(), StoreError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(StoreError::Timeout(Duration::from_secs(10)));
        }

        submission.created_at = Some(Utc::now());
        submission.id = Some(Uuid::new_v4());
        self.saved.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FormSubmission>, StoreError> {
        if self.fail_saves {
            return Err(StoreError::Timeout(Duration::from_secs(10)));
        }
        Ok(self.saved.lock().unwrap().clone())
    }
}

/// Pretends to upload: returns `https://cdn.test/<file name>`, and fails for any
/// file whose name starts with `fail`. Records every file name it was handed.
#[derive(Default)]
pub struct RecordingUploader {
    pub seen: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaUploader for RecordingUploader {
    async fn upload(&self, file: UploadFile) -> Result<UploadedMedia, UploadError> {
        self.seen.lock().unwrap().push(file.file_name.clone());
        if file.file_name.starts_with("fail") {
            return Err(UploadError::Rejected {
                status: 400,
                message: "Invalid image file".to_string(),
            });
        }
        Ok(UploadedMedia {
            url: format!("https://cdn.test/{}", file.file_name),
            media_type: file.media_type(),
        })
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub uploader: Arc<RecordingUploader>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a multipart form to `/api/upload`, return (body, status).
    pub async fn upload(&self, form: Form) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploader.seen.lock().unwrap().clone()
    }
}

pub fn test_config(max_body_size: usize) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        database_name: "form_builder_test".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        max_body_size,
        log_level: "warn".to_string(),
        cloudinary: None,
        upload: UploadSettings::default(),
        store_timeout: Duration::from_secs(10),
    }
}

/// Build a form from rows of (description, file count) plus a flat file list.
pub fn upload_form(descriptions: &[&str], file_counts: &[&str], files: &[(&str, &str)]) -> Form {
    let mut form = Form::new();
    for d in descriptions {
        form = form.text("descriptions", d.to_string());
    }
    for c in file_counts {
        form = form.text("fileCount", c.to_string());
    }
    for (name, content_type) in files {
        let part = Part::bytes(format!("bytes of {name}").into_bytes())
            .file_name(name.to_string())
            .mime_str(content_type)
            .unwrap();
        form = form.part("files", part);
    }
    form
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(MemoryStore::default(), 1_048_576).await
}

pub async fn spawn_app_with(store: MemoryStore, max_body_size: usize) -> TestApp {
    let store = Arc::new(store);
    let uploader = Arc::new(RecordingUploader::default());

    let app = form_builder::build_app(
        test_config(max_body_size),
        uploader.clone(),
        store.clone(),
    );

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        store,
        uploader,
    }
}
