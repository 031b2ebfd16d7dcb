//! Warm the cache for every resource in one concurrent pass.

use serde_json::Value;
use tracing::{info, warn};

use crate::models::Content;
use crate::repository::ContentRepository;
use crate::resource::Resource;
use crate::services::FetchResult;

/// What happened to one resource during a preload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// Fetched and cached `count` items.
    Cached { count: usize },
    /// The backend returned nothing; the cache was left alone.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadReport {
    pub outcomes: Vec<(Resource, PreloadOutcome)>,
}

impl PreloadReport {
    pub fn cached(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PreloadOutcome::Cached { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PreloadOutcome::Failed(_)))
            .count()
    }

    pub fn outcome(&self, resource: Resource) -> Option<&PreloadOutcome> {
        self.outcomes
            .iter()
            .find(|(r, _)| *r == resource)
            .map(|(_, o)| o)
    }
}

/// Items in a JSON section: array length, or the summed lengths of a
/// grouped mapping.
fn item_count(data: &Value) -> usize {
    match data {
        Value::Array(items) => items.len(),
        Value::Object(groups) => groups
            .values()
            .map(|v| v.as_array().map(Vec::len).unwrap_or(1))
            .sum(),
        Value::Null => 0,
        _ => 1,
    }
}

fn settle(repo: &ContentRepository, resource: Resource, result: FetchResult<Value>) -> PreloadOutcome {
    match result {
        FetchResult::Data(data) if data.is_empty() => PreloadOutcome::Empty,
        FetchResult::Data(data) => {
            repo.dual_mode().cache().set(resource.key(), &data);
            PreloadOutcome::Cached {
                count: item_count(&data),
            }
        }
        FetchResult::Error(message) => {
            warn!(resource = %resource, error = %message, "Preload fetch failed");
            PreloadOutcome::Failed(message)
        }
    }
}

/// Fetch all resources concurrently and cache each non-empty result.
/// Individual failures are recorded, never propagated.
pub async fn preload_all(repo: &ContentRepository) -> PreloadReport {
    let (skills, projects, experience, certifications, achievements, blogs) = tokio::join!(
        repo.fetch(Resource::Skills),
        repo.fetch(Resource::Projects),
        repo.fetch(Resource::Experience),
        repo.fetch(Resource::Certifications),
        repo.fetch(Resource::Achievements),
        repo.fetch(Resource::Blogs),
    );

    let outcomes: Vec<(Resource, PreloadOutcome)> = [
        (Resource::Skills, skills),
        (Resource::Projects, projects),
        (Resource::Experience, experience),
        (Resource::Certifications, certifications),
        (Resource::Achievements, achievements),
        (Resource::Blogs, blogs),
    ]
    .into_iter()
    .map(|(resource, result)| (resource, settle(repo, resource, result)))
    .collect();

    let report = PreloadReport { outcomes };
    info!(
        cached = report.cached(),
        failed = report.failed(),
        "Portfolio data preloaded"
    );
    report
}
