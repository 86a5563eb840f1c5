use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tokio::sync::OnceCell;

use crate::config::{CloudinaryConfig, SignatureAlgorithm, UploadSettings};
use crate::models::MediaType;

use super::{MediaUploader, UploadError, UploadFile, UploadedMedia};

/// Uploads media to Cloudinary. The HTTP client is built on first use and reused after;
/// a failed initialization is retried on the next call.
pub struct CloudinaryUploader {
    credentials: Option<CloudinaryConfig>,
    settings: UploadSettings,
    client: OnceCell<CloudinaryClient>,
}

struct CloudinaryClient {
    http: reqwest::Client,
    credentials: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: Option<String>,
    secure_url: Option<String>,
    url: Option<String>,
    bytes: Option<u64>,
    resource_type: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryUploader {
    pub fn new(credentials: Option<CloudinaryConfig>, settings: UploadSettings) -> Self {
        Self {
            credentials,
            settings,
            client: OnceCell::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn client(&self) -> Result<&CloudinaryClient, UploadError> {
        self.client
            .get_or_try_init(|| async {
                let credentials = self.credentials.clone().ok_or_else(|| {
                    UploadError::Configuration("Cloudinary credentials not set".to_string())
                })?;

                // The per-upload budget is enforced around the whole request in `upload`
                let http = reqwest::Client::builder()
                    .build()
                    .map_err(|e| {
                        UploadError::Configuration(format!("Failed to build HTTP client: {e}"))
                    })?;

                tracing::info!(cloud = %credentials.cloud_name, "Cloudinary client initialized");

                Ok::<_, UploadError>(CloudinaryClient { http, credentials })
            })
            .await
    }

    async fn send(
        &self,
        client: &CloudinaryClient,
        file: UploadFile,
        media_type: MediaType,
    ) -> Result<UploadedMedia, UploadError> {
        let url = format!(
            "{}/{}/{}/upload",
            self.settings.api_base,
            client.credentials.cloud_name,
            media_type.as_str()
        );

        let timestamp = Utc::now().timestamp().to_string();
        let signed = [
            ("folder", self.settings.folder.as_str()),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign(
            &signed,
            &client.credentials.api_secret,
            self.settings.signature_algorithm,
        );

        let len = file.data.len() as u64;
        let mut part = Part::stream_with_length(reqwest::Body::from(file.data), len)
            .file_name(file.file_name.clone());
        if let Some(ct) = file.content_type.as_deref().filter(|ct| !ct.is_empty()) {
            part = part.mime_str(ct)?;
        }

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", client.credentials.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.settings.folder.clone())
            .text("signature", signature);
        if self.settings.signature_algorithm != SignatureAlgorithm::Sha1 {
            form = form.text(
                "signature_algorithm",
                self.settings.signature_algorithm.as_str(),
            );
        }

        let resp = client.http.post(&url).multipart(form).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.chars().take(512).collect());
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let result: UploadResponse = resp
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            public_id = result.public_id.as_deref().unwrap_or(""),
            secure_url = result.secure_url.as_deref().unwrap_or(""),
            url = result.url.as_deref().unwrap_or(""),
            bytes = result.bytes.unwrap_or(0),
            resource_type = result.resource_type.as_deref().unwrap_or(""),
            format = result.format.as_deref().unwrap_or(""),
            "Cloudinary upload result"
        );

        let secure_url = result
            .secure_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| UploadError::InvalidResponse("missing secure_url".to_string()))?;

        Ok(UploadedMedia {
            url: secure_url,
            media_type,
        })
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, file: UploadFile) -> Result<UploadedMedia, UploadError> {
        let client = self.client().await?;
        let media_type = file.media_type();

        tracing::info!(
            file_name = %file.file_name,
            size = file.size(),
            content_type = file.content_type.as_deref().unwrap_or(""),
            resource_type = %media_type,
            "Uploading media"
        );

        let limit = self.settings.timeout;
        tokio::time::timeout(limit, self.send(client, file, media_type))
            .await
            .map_err(|_| UploadError::Timeout(limit))?
    }
}

/// Cloudinary request signature: the params sorted by key, joined as `k=v&k=v`,
/// with the API secret appended, then hex-digested.
pub fn sign(params: &[(&str, &str)], api_secret: &str, algorithm: SignatureAlgorithm) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let payload = format!("{to_sign}{api_secret}");

    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_documented_example() {
        // Example from Cloudinary's authentication docs.
        let sig = sign(
            &[
                ("timestamp", "1315060510"),
                ("public_id", "sample_image"),
                ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop"),
            ],
            "abcd",
            SignatureAlgorithm::Sha1,
        );
        assert_eq!(sig, "bfd09f95f331f558cbd1320e67aa8d488770583e");
    }

    #[test]
    fn signature_ignores_param_order_and_empty_values() {
        let a = sign(
            &[("timestamp", "1"), ("folder", "f"), ("tags", "")],
            "secret",
            SignatureAlgorithm::Sha256,
        );
        let b = sign(
            &[("folder", "f"), ("timestamp", "1")],
            "secret",
            SignatureAlgorithm::Sha256,
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    fn png(name: &str) -> UploadFile {
        UploadFile {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            data: bytes::Bytes::from_static(b"png"),
        }
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_uploading() {
        let uploader = CloudinaryUploader::new(None, UploadSettings::default());
        assert!(!uploader.is_configured());

        let err = uploader.upload(png("a.png")).await.unwrap_err();
        assert!(matches!(err, UploadError::Configuration(_)));

        // A failed initialization leaves the cell empty so the next call retries
        assert!(uploader.client.get().is_none());
        let err = uploader.upload(png("b.png")).await.unwrap_err();
        assert!(matches!(err, UploadError::Configuration(_)));
        assert!(uploader.client.get().is_none());
    }

    #[tokio::test]
    async fn client_is_built_once_on_first_upload() {
        let uploader = CloudinaryUploader::new(
            Some(CloudinaryConfig {
                cloud_name: "demo".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
            }),
            UploadSettings {
                // Nothing listens here; the uploads fail but still go through the client
                api_base: "http://127.0.0.1:9".to_string(),
                timeout: std::time::Duration::from_secs(5),
                ..UploadSettings::default()
            },
        );
        assert!(uploader.is_configured());
        assert!(uploader.client.get().is_none());

        let _ = uploader.upload(png("a.png")).await;
        let first = uploader.client.get().expect("client built on first upload") as *const CloudinaryClient;

        let _ = uploader.upload(png("b.png")).await;
        let again = uploader.client().await.unwrap();
        assert!(std::ptr::eq(first, again));
    }
}
