pub mod submission;

pub use submission::{FormRow, FormSubmission, MediaFile, MediaType, SubmissionRecord};
