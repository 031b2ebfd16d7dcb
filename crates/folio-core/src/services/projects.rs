use std::sync::Arc;

use serde::Serialize;

use crate::api::{Backend, Query};
use crate::models::{Project, RecordId};

use super::storage::{upload_record_image, UploadFile};
use super::table::TableService;
use super::FetchResult;

#[derive(Clone)]
pub struct ProjectService {
    table: TableService<Project>,
}

impl ProjectService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            table: TableService::new(backend),
        }
    }

    /// All projects, newest first.
    pub async fn get_all(&self) -> FetchResult<Vec<Project>> {
        self.table.get_all(&Query::new().order("created_at", false)).await
    }

    pub async fn get_by_id(&self, id: &RecordId) -> FetchResult<Project> {
        self.table.get_by_id(id).await
    }

    pub async fn create<B: Serialize + Sync>(&self, record: &B) -> FetchResult<Project> {
        self.table.create(record).await
    }

    pub async fn update<B: Serialize + Sync>(&self, id: &RecordId, patch: &B) -> FetchResult<Project> {
        self.table.update(id, patch).await
    }

    pub async fn delete(&self, id: &RecordId) -> FetchResult<()> {
        self.table.delete(id).await
    }

    /// Store a project image as `projects/<id>-<millis>.<ext>` and return its public URL.
    pub async fn upload_image(&self, file: &UploadFile, id: &RecordId) -> FetchResult<String> {
        upload_record_image(self.table.backend().as_ref(), "projects", &id.to_string(), file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use serde_json::json;

    #[tokio::test]
    async fn test_projects_newest_first() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            "projects",
            vec![
                json!({"id": 1, "title": "CrimeNet", "description": "d", "created_at": "2024-05-01T00:00:00Z"}),
                json!({"id": 2, "title": "EchoVerse", "description": "d", "created_at": "2025-01-10T00:00:00Z"}),
            ],
        );
        let projects = ProjectService::new(backend).get_all().await.into_data().unwrap();
        assert_eq!(projects[0].title, "EchoVerse");
    }

    #[tokio::test]
    async fn test_project_image_upload() {
        let backend = Arc::new(MemoryBackend::new());
        let service = ProjectService::new(backend.clone());
        let file = UploadFile::new("shot.jpeg", "image/jpeg", vec![9; 16]);
        let url = service
            .upload_image(&file, &RecordId::Int(3))
            .await
            .into_data()
            .unwrap();
        assert!(url.contains("/images/projects/3-"));
        let listed = backend.list("images", "projects", 10).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
