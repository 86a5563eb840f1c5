use axum::http::HeaderMap;

use crate::media::UploadFile;

/// Raw multipart fields of an upload, kept in submission order.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub descriptions: Vec<String>,
    pub files: Vec<UploadFile>,
    pub file_counts: Vec<String>,
}

/// Parse multipart form data using multer.
pub async fn parse_upload_form(headers: &HeaderMap, body: bytes::Bytes) -> Result<UploadForm, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "descriptions" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| format!("Field read error: {e}"))?;
                form.descriptions.push(value);
            }
            "fileCount" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| format!("Field read error: {e}"))?;
                form.file_counts.push(value);
            }
            "files" => {
                // A part without a filename is a plain value, not an attachment
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    tracing::debug!("Ignoring files part without a filename");
                    continue;
                };
                let content_type = field.content_type().map(|m| m.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("File read error: {e}"))?;
                form.files.push(UploadFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            other => {
                tracing::debug!("Ignoring unknown form field: {other}");
            }
        }
    }

    Ok(form)
}
