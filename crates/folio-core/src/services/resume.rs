use std::sync::Arc;

use crate::api::Backend;
use crate::cache::now_millis;

use super::storage::{is_valid_pdf, upload_to, UploadFile, DOCUMENTS_BUCKET};
use super::table::execute;
use super::FetchResult;

const RESUME_FOLDER: &str = "resumes";

/// The downloadable resume, kept as timestamped PDFs in the documents bucket.
#[derive(Clone)]
pub struct ResumeService {
    backend: Arc<dyn Backend>,
}

impl ResumeService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Upload a new resume as `resumes/resume-<millis>.pdf`, returning its public URL.
    pub async fn upload(&self, file: &UploadFile) -> FetchResult<String> {
        if !is_valid_pdf(file) {
            return FetchResult::error_message("Please select a PDF file");
        }
        let path = format!("{}/resume-{}.pdf", RESUME_FOLDER, now_millis());
        upload_to(self.backend.as_ref(), DOCUMENTS_BUCKET, &path, file).await
    }

    /// Public URL of the most recently uploaded resume.
    pub async fn latest(&self) -> FetchResult<String> {
        let listed = execute(
            DOCUMENTS_BUCKET,
            "latest_resume",
            self.backend.list(DOCUMENTS_BUCKET, RESUME_FOLDER, 1),
        )
        .await;

        listed.and_then(|objects| match objects.first() {
            Some(newest) => FetchResult::Data(self.backend.public_url(
                DOCUMENTS_BUCKET,
                &format!("{}/{}", RESUME_FOLDER, newest.name),
            )),
            None => FetchResult::error_message("No resume found"),
        })
    }

    /// Delete a resume by its file name inside the resume folder.
    pub async fn delete(&self, file_name: &str) -> FetchResult<()> {
        let paths = [format!("{}/{}", RESUME_FOLDER, file_name)];
        execute(
            DOCUMENTS_BUCKET,
            "delete_resume",
            self.backend.remove(DOCUMENTS_BUCKET, &paths),
        )
        .await
    }
}
