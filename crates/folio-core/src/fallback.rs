//! Static fallback dataset, bundled into the binary.
//!
//! This is the content of last resort: whenever the backend is unreachable
//! or returns nothing, the dual-mode loader serves these values instead.

use std::sync::OnceLock;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::models::Portfolio;
use crate::resource::Resource;

/// Bundled dataset, parsed once on first access
static PORTFOLIO: OnceLock<Portfolio> = OnceLock::new();

const BUNDLED_JSON: &str = include_str!("../data/portfolio.json");

fn load_bundled() -> Result<Portfolio, serde_json::Error> {
    let portfolio: Portfolio = serde_json::from_str(BUNDLED_JSON)?;
    debug!(
        projects = portfolio.projects.len(),
        skills = portfolio.skills.total(),
        version = %portfolio.metadata.version,
        "Loaded bundled portfolio data"
    );
    Ok(portfolio)
}

/// The bundled portfolio.
pub fn portfolio() -> &'static Portfolio {
    PORTFOLIO.get_or_init(|| {
        load_bundled().unwrap_or_else(|e| {
            error!(error = %e, "Bundled portfolio data is malformed, serving empty sections");
            Portfolio::default()
        })
    })
}

pub(crate) fn to_json<T: Serialize>(data: &T) -> Value {
    serde_json::to_value(data).unwrap_or_else(|e| {
        error!(error = %e, "Failed to convert section to JSON");
        Value::Null
    })
}

/// Static data for one resource, as JSON.
pub fn section(resource: Resource) -> Value {
    let portfolio = portfolio();
    match resource {
        Resource::Skills => to_json(&portfolio.skills),
        Resource::Projects => to_json(&portfolio.projects),
        Resource::Experience => to_json(&portfolio.experience),
        Resource::Certifications => to_json(&portfolio.certifications),
        Resource::Achievements => to_json(&portfolio.achievements),
        Resource::Blogs => to_json(&portfolio.blogs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkillCategory;

    #[test]
    fn test_bundled_data_parses() {
        let portfolio = load_bundled().expect("bundled portfolio.json must parse");
        assert_eq!(portfolio.hero.role, "Java Full Stack Developer");
        assert_eq!(portfolio.projects.len(), 3);
        assert_eq!(portfolio.experience.len(), 2);
        assert_eq!(portfolio.certifications.len(), 3);
        assert_eq!(portfolio.achievements.len(), 3);
        assert_eq!(portfolio.education.len(), 3);
        assert!(portfolio.blogs.is_empty());
    }

    #[test]
    fn test_bundled_skills_cover_every_category() {
        let skills = &portfolio().skills;
        let categories: Vec<SkillCategory> = skills.categories().collect();
        assert_eq!(categories, SkillCategory::ALL.to_vec());
        assert_eq!(skills.get(SkillCategory::Programming)[0].name, "Java");
    }

    #[test]
    fn test_sections_as_json() {
        let skills = section(Resource::Skills);
        assert_eq!(skills.as_object().map(|m| m.len()), Some(5));
        assert!(skills["programming"].is_array());
        assert_eq!(section(Resource::Projects).as_array().map(Vec::len), Some(3));
        assert_eq!(section(Resource::Blogs), serde_json::json!([]));
    }
}
