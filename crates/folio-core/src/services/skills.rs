use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::api::{Backend, Query};
use crate::models::{RecordId, Skill, SkillGroups};

use super::table::{execute, TableService};
use super::FetchResult;

#[derive(Clone)]
pub struct SkillsService {
    table: TableService<Skill>,
}

impl SkillsService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            table: TableService::new(backend),
        }
    }

    /// Active skills in display order, grouped by category.
    ///
    /// Public entries carry only name, level, category and description.
    pub async fn get_all(&self) -> FetchResult<SkillGroups> {
        self.table
            .get_all(&Query::new().eq("is_active", true).order("display_order", true))
            .await
            .map(|rows| {
                let public = rows
                    .into_iter()
                    .map(|skill| Skill {
                        id: None,
                        display_order: None,
                        is_active: None,
                        ..skill
                    })
                    .collect();
                SkillGroups::from_rows(public)
            })
    }

    /// Every skill, ordered by category and then display order.
    pub async fn get_all_admin(&self) -> FetchResult<Vec<Skill>> {
        self.table
            .get_all(
                &Query::new()
                    .order("category", true)
                    .order("display_order", true),
            )
            .await
    }

    pub async fn get_by_id(&self, id: &RecordId) -> FetchResult<Skill> {
        self.table.get_by_id(id).await
    }

    pub async fn create<B: Serialize + Sync>(&self, record: &B) -> FetchResult<Skill> {
        self.table.create(record).await
    }

    pub async fn update<B: Serialize + Sync>(&self, id: &RecordId, patch: &B) -> FetchResult<Skill> {
        self.table.update(id, patch).await
    }

    /// Soft delete.
    pub async fn delete(&self, id: &RecordId) -> FetchResult<()> {
        self.table.soft_delete(id).await
    }

    pub async fn hard_delete(&self, id: &RecordId) -> FetchResult<()> {
        self.table.delete(id).await
    }

    /// Persist a new ordering: each id gets its position as `display_order`.
    pub async fn reorder(&self, ids: &[RecordId]) -> FetchResult<()> {
        let updates = ids
            .iter()
            .enumerate()
            .map(|(index, id)| json!({ "id": id.to_value(), "display_order": index }))
            .collect();
        let backend = self.table.backend();
        execute(self.table.table(), "reorder", backend.upsert(self.table.table(), updates)).await
    }
}
