use std::sync::Arc;

use serde::Serialize;

use crate::api::{Backend, Query};
use crate::models::{BlogPost, RecordId};

use super::storage::{upload_record_image, UploadFile};
use super::table::TableService;
use super::FetchResult;

#[derive(Clone)]
pub struct BlogService {
    table: TableService<BlogPost>,
}

impl BlogService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            table: TableService::new(backend),
        }
    }

    pub async fn get_all(&self) -> FetchResult<Vec<BlogPost>> {
        self.table.get_all(&Query::new().order("created_at", false)).await
    }

    pub async fn get_by_id(&self, id: &RecordId) -> FetchResult<BlogPost> {
        self.table.get_by_id(id).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> FetchResult<BlogPost> {
        self.table
            .get_one(&Query::new().eq("slug", slug), &format!("blog '{}'", slug))
            .await
    }

    pub async fn create<B: Serialize + Sync>(&self, record: &B) -> FetchResult<BlogPost> {
        self.table.create(record).await
    }

    pub async fn update<B: Serialize + Sync>(&self, id: &RecordId, patch: &B) -> FetchResult<BlogPost> {
        self.table.update(id, patch).await
    }

    pub async fn delete(&self, id: &RecordId) -> FetchResult<()> {
        self.table.delete(id).await
    }

    pub async fn upload_image(&self, file: &UploadFile, id: &RecordId) -> FetchResult<String> {
        upload_record_image(self.table.backend().as_ref(), "blogs", &id.to_string(), file).await
    }
}
