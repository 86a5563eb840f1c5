use std::sync::Arc;

use crate::media::MediaUploader;
use crate::store::SubmissionStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub uploader: Arc<dyn MediaUploader>,
    pub store: Arc<dyn SubmissionStore>,
}
