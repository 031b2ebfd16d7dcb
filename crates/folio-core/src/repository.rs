use std::sync::Arc;

use serde_json::Value;

use crate::api::Backend;
use crate::dual_mode::{DualMode, Loaded, ResourceHandle};
use crate::fallback::{self, to_json};
use crate::models::{Achievement, BlogPost, Certification, Experience, Project, SkillGroups};
use crate::resource::Resource;
use crate::services::{
    AchievementsService, BlogService, CertificationsService, ExperienceService, FetchResult,
    ProjectService, SkillsService,
};

/// Each content resource bound to its service, cache key and static data.
#[derive(Clone)]
pub struct ContentRepository {
    dual: DualMode,
    skills: SkillsService,
    projects: ProjectService,
    experience: ExperienceService,
    certifications: CertificationsService,
    achievements: AchievementsService,
    blogs: BlogService,
}

impl ContentRepository {
    pub fn new(backend: Arc<dyn Backend>, dual: DualMode) -> Self {
        Self {
            dual,
            skills: SkillsService::new(Arc::clone(&backend)),
            projects: ProjectService::new(Arc::clone(&backend)),
            experience: ExperienceService::new(Arc::clone(&backend)),
            certifications: CertificationsService::new(Arc::clone(&backend)),
            achievements: AchievementsService::new(Arc::clone(&backend)),
            blogs: BlogService::new(backend),
        }
    }

    pub fn dual_mode(&self) -> &DualMode {
        &self.dual
    }

    pub async fn skills(&self) -> Loaded<SkillGroups> {
        self.dual
            .load(
                Resource::Skills.key(),
                || fallback::portfolio().skills.clone(),
                || self.skills.get_all(),
            )
            .await
    }

    pub async fn projects(&self) -> Loaded<Vec<Project>> {
        self.dual
            .load(
                Resource::Projects.key(),
                || fallback::portfolio().projects.clone(),
                || self.projects.get_all(),
            )
            .await
    }

    pub async fn experience(&self) -> Loaded<Vec<Experience>> {
        self.dual
            .load(
                Resource::Experience.key(),
                || fallback::portfolio().experience.clone(),
                || self.experience.get_all(),
            )
            .await
    }

    pub async fn certifications(&self) -> Loaded<Vec<Certification>> {
        self.dual
            .load(
                Resource::Certifications.key(),
                || fallback::portfolio().certifications.clone(),
                || self.certifications.get_all(),
            )
            .await
    }

    pub async fn achievements(&self) -> Loaded<Vec<Achievement>> {
        self.dual
            .load(
                Resource::Achievements.key(),
                || fallback::portfolio().achievements.clone(),
                || self.achievements.get_all(),
            )
            .await
    }

    /// Blog posts have no bundled content, so the fallback is an empty list.
    pub async fn blogs(&self) -> Loaded<Vec<BlogPost>> {
        self.dual
            .load(
                Resource::Blogs.key(),
                || fallback::portfolio().blogs.clone(),
                || self.blogs.get_all(),
            )
            .await
    }

    /// Remote data for one resource as JSON, bypassing cache and fallback.
    pub async fn fetch(&self, resource: Resource) -> FetchResult<Value> {
        match resource {
            Resource::Skills => self.skills.get_all().await.map(|d| to_json(&d)),
            Resource::Projects => self.projects.get_all().await.map(|d| to_json(&d)),
            Resource::Experience => self.experience.get_all().await.map(|d| to_json(&d)),
            Resource::Certifications => self.certifications.get_all().await.map(|d| to_json(&d)),
            Resource::Achievements => self.achievements.get_all().await.map(|d| to_json(&d)),
            Resource::Blogs => self.blogs.get_all().await.map(|d| to_json(&d)),
        }
    }

    /// Dual-mode load of any resource as JSON.
    ///
    /// Cache entries are the JSON form of the typed data, so this path and
    /// the typed loaders share them.
    pub async fn load(&self, resource: Resource) -> Loaded<Value> {
        self.dual
            .load(
                resource.key(),
                || fallback::section(resource),
                || self.fetch(resource),
            )
            .await
    }

    /// Mount a consumer of `resource` on a background task.
    pub fn spawn(&self, resource: Resource) -> ResourceHandle<Value> {
        let repo = self.clone();
        self.dual.spawn(
            resource.key(),
            move || fallback::section(resource),
            move || async move { repo.fetch(resource).await },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use crate::cache::{MemoryStore, PersistedCache};
    use crate::dual_mode::FallbackReason;
    use serde_json::json;

    fn repository(backend: Arc<MemoryBackend>) -> ContentRepository {
        let cache = PersistedCache::with_default_prefix(Arc::new(MemoryStore::new()));
        ContentRepository::new(backend, DualMode::with_default_ttl(cache))
    }

    #[tokio::test]
    async fn test_typed_and_json_paths_share_cache() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed(
            "projects",
            vec![json!({"id": 1, "title": "Remote", "description": "d", "created_at": "2025-01-01"})],
        );
        let repo = repository(backend.clone());

        let typed = repo.projects().await;
        assert_eq!(typed.source(), "remote");

        let json = repo.load(Resource::Projects).await;
        assert_eq!(json.source(), "cache");
        assert_eq!(json.data()[0]["title"], "Remote");
        assert_eq!(backend.select_count(), 1);
    }

    #[tokio::test]
    async fn test_blogs_fall_back_to_empty_list() {
        let repo = repository(Arc::new(MemoryBackend::new()));
        let loaded = repo.blogs().await;
        assert!(matches!(loaded, Loaded::Fallback { reason: FallbackReason::Empty, .. }));
        assert!(loaded.data().is_empty());
    }

    #[tokio::test]
    async fn test_spawned_handle_resolves_to_static_on_failure() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_with("offline");
        let repo = repository(backend);

        let state = repo.spawn(Resource::Achievements).wait().await;
        assert_eq!(state.data.and_then(|d| d.as_array().map(Vec::len)), Some(3));
        assert!(state.error.is_none());
    }
}
