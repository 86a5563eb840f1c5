use crate::models::{FormRow, FormSubmission, MediaFile};
use crate::state::SharedState;
use crate::store::StoreError;

use super::parser::UploadForm;
use super::rows;

#[derive(Debug)]
pub enum PipelineError {
    BadInput(String),
    Storage(StoreError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::BadInput(msg) => write!(f, "{msg}"),
            PipelineError::Storage(err) => write!(f, "{err}"),
        }
    }
}

/// Correlate files to rows, upload them one at a time and persist the result.
///
/// A failed upload drops that file from its row and processing continues. Only a
/// failed save fails the whole submission; media uploaded before it stays remote.
pub async fn run(state: &SharedState, form: UploadForm) -> Result<FormSubmission, PipelineError> {
    if form.descriptions.is_empty() {
        return Err(PipelineError::BadInput("No descriptions provided".to_string()));
    }

    let pending = rows::correlate(form.descriptions, &form.file_counts, form.files);

    let mut submission_rows = Vec::with_capacity(pending.len());
    for (row_index, row) in pending.into_iter().enumerate() {
        let mut form_row = FormRow::new(row.description);

        for file in row.files {
            let file_name = file.file_name.clone();
            match state.uploader.upload(file).await {
                Ok(uploaded) => form_row.media.push(MediaFile {
                    url: uploaded.url,
                    media_type: uploaded.media_type,
                }),
                Err(e) => {
                    tracing::warn!(row = row_index, file_name = %file_name, "Error uploading file: {e}");
                }
            }
        }

        submission_rows.push(form_row);
    }

    let mut submission = FormSubmission::new(submission_rows);
    state
        .store
        .save(&mut submission)
        .await
        .map_err(PipelineError::Storage)?;

    if let Some(id) = submission.id {
        tracing::info!("Saved submission {id} with {} rows", submission.rows.len());
    }

    Ok(submission)
}
