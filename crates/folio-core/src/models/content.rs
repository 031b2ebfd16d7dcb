use serde::{Deserialize, Serialize};

use super::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, alias = "githubUrl")]
    pub github_url: Option<String>,
    #[serde(default, alias = "liveUrl")]
    pub live_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: RecordId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: RecordId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub id: RecordId,
    pub title: String,
    pub issuer: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "credentialId")]
    pub credential_id: Option<String>,
    #[serde(default, alias = "credentialUrl")]
    pub credential_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_accepts_camel_case_links() {
        let project: Project = serde_json::from_value(json!({
            "id": 1,
            "title": "CrimeNet",
            "description": "Public safety platform",
            "githubUrl": "https://github.com/example/crimenet",
            "liveUrl": null
        }))
        .unwrap();
        assert_eq!(project.github_url.as_deref(), Some("https://github.com/example/crimenet"));
        assert!(project.tech.is_empty());
    }

    #[test]
    fn test_experience_type_field() {
        let exp: Experience = serde_json::from_value(json!({
            "id": 1,
            "type": "Internship",
            "role": "Developer Intern",
            "company": "Acme",
            "start_date": "Mar 2025",
            "end_date": "Sep 2025"
        }))
        .unwrap();
        assert_eq!(exp.kind.as_deref(), Some("Internship"));
        assert_eq!(exp.end_date.as_deref(), Some("Sep 2025"));
        assert!(!exp.current);
    }
}
