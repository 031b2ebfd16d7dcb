//! Curated collections with an `is_active` flag and a manual `display_order`.
//!
//! Experience, certifications and achievements share the same shape: the
//! public listing shows active rows in display order, admins see everything,
//! and `delete` only hides a row.

use std::sync::Arc;

use serde::Serialize;

use crate::api::{Backend, Query};
use crate::models::{Achievement, Certification, Experience, RecordId};

use super::storage::{upload_record_image, UploadFile};
use super::table::{TableRow, TableService};
use super::FetchResult;

pub type ExperienceService = CatalogService<Experience>;
pub type CertificationsService = CatalogService<Certification>;
pub type AchievementsService = CatalogService<Achievement>;

pub struct CatalogService<T> {
    table: TableService<T>,
}

impl<T> Clone for CatalogService<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

fn active() -> Query {
    Query::new().eq("is_active", true)
}

impl<T: TableRow> CatalogService<T> {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            table: TableService::new(backend),
        }
    }

    /// Active rows in display order.
    pub async fn get_all(&self) -> FetchResult<Vec<T>> {
        self.table
            .get_all(&active().order("display_order", true))
            .await
    }

    /// Every row, including hidden ones, in display order.
    pub async fn get_all_admin(&self) -> FetchResult<Vec<T>> {
        self.table
            .get_all(&Query::new().order("display_order", true))
            .await
    }

    pub async fn get_by_id(&self, id: &RecordId) -> FetchResult<T> {
        self.table.get_by_id(id).await
    }

    pub async fn create<B: Serialize + Sync>(&self, record: &B) -> FetchResult<T> {
        self.table.create(record).await
    }

    pub async fn update<B: Serialize + Sync>(&self, id: &RecordId, patch: &B) -> FetchResult<T> {
        self.table.update(id, patch).await
    }

    /// Soft delete: the row stays but leaves the public listing.
    pub async fn delete(&self, id: &RecordId) -> FetchResult<()> {
        self.table.soft_delete(id).await
    }

    pub async fn hard_delete(&self, id: &RecordId) -> FetchResult<()> {
        self.table.delete(id).await
    }
}

impl CatalogService<Experience> {
    /// Active positions still in progress, most recent start first.
    pub async fn get_current(&self) -> FetchResult<Vec<Experience>> {
        self.table
            .get_all(&active().eq("current", true).order("start_date", false))
            .await
    }
}

impl CatalogService<Achievement> {
    pub async fn get_by_category(&self, category: &str) -> FetchResult<Vec<Achievement>> {
        self.table
            .get_all(&active().eq("category", category).order("display_order", true))
            .await
    }
}

impl CatalogService<Certification> {
    pub async fn upload_image(&self, file: &UploadFile, id: &RecordId) -> FetchResult<String> {
        upload_record_image(
            self.table.backend().as_ref(),
            "certifications",
            &id.to_string(),
            file,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use serde_json::json;

    fn achievements_backend() -> Arc<MemoryBackend> {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            "achievements",
            vec![
                json!({"id": 1, "title": "Hackathon", "category": "competition", "display_order": 2, "is_active": true}),
                json!({"id": 2, "title": "Dean's List", "category": "academic", "display_order": 1, "is_active": true}),
                json!({"id": 3, "title": "Old award", "category": "competition", "display_order": 0, "is_active": false}),
            ],
        );
        backend
    }

    fn titles(items: &[Achievement]) -> Vec<&str> {
        items.iter().map(|a| a.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_public_listing_hides_inactive_rows() {
        let service = AchievementsService::new(achievements_backend());
        let all = service.get_all().await.into_data().unwrap();
        assert_eq!(titles(&all), vec!["Dean's List", "Hackathon"]);

        let admin = service.get_all_admin().await.into_data().unwrap();
        assert_eq!(titles(&admin), vec!["Old award", "Dean's List", "Hackathon"]);
    }

    #[tokio::test]
    async fn test_get_by_category() {
        let service = AchievementsService::new(achievements_backend());
        let found = service.get_by_category("competition").await.into_data().unwrap();
        assert_eq!(titles(&found), vec!["Hackathon"]);
    }

    #[tokio::test]
    async fn test_delete_is_soft_and_hard_delete_removes() {
        let backend = achievements_backend();
        let service = AchievementsService::new(backend.clone());

        assert!(service.delete(&RecordId::Int(1)).await.is_ok());
        assert_eq!(backend.rows("achievements").len(), 3);
        assert_eq!(service.get_all().await.into_data().unwrap().len(), 1);

        assert!(service.hard_delete(&RecordId::Int(1)).await.is_ok());
        assert_eq!(backend.rows("achievements").len(), 2);
    }

    #[tokio::test]
    async fn test_current_experience() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            "experience",
            vec![
                json!({"id": 1, "role": "Intern", "company": "A", "current": true, "is_active": true, "start_date": "2024-01"}),
                json!({"id": 2, "role": "Engineer", "company": "B", "current": true, "is_active": true, "start_date": "2025-03"}),
                json!({"id": 3, "role": "Trainee", "company": "C", "current": false, "is_active": true, "start_date": "2023-06"}),
            ],
        );
        let current = ExperienceService::new(backend).get_current().await.into_data().unwrap();
        let companies: Vec<&str> = current.iter().map(|e| e.company.as_str()).collect();
        assert_eq!(companies, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_certification_image_path() {
        let backend = Arc::new(MemoryBackend::new());
        let service = CertificationsService::new(backend);
        let file = UploadFile::new("badge.webp", "image/webp", vec![1, 2, 3]);
        let url = service
            .upload_image(&file, &RecordId::Int(7))
            .await
            .into_data()
            .unwrap();
        assert!(url.contains("/images/certifications/7-"));
        assert!(url.ends_with(".webp"));
    }
}
