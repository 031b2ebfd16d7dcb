//! Static-only sections of the portfolio and the full bundled dataset.

use serde::{Deserialize, Serialize};

use super::{Achievement, BlogPost, Certification, Experience, Project, RecordId, SkillGroups};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
    pub role: String,
    pub tagline: String,
    pub greeting: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct About {
    pub title: String,
    pub objective: String,
    pub bio: String,
    pub years_of_experience: String,
    pub projects_completed: String,
    pub technologies_worked: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: RecordId,
    pub degree: String,
    pub field: String,
    pub institution: String,
    #[serde(default)]
    pub location: Option<String>,
    pub duration: String,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub preferred_contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    pub display: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub github: Option<SocialLink>,
    #[serde(default)]
    pub linkedin: Option<SocialLink>,
    #[serde(default)]
    pub email: Option<SocialLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub last_updated: String,
    pub version: String,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Every section of the site, as bundled with the binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub hero: Hero,
    pub about: About,
    #[serde(default)]
    pub education: Vec<Education>,
    pub skills: SkillGroups,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub blogs: Vec<BlogPost>,
    pub contact: ContactInfo,
    #[serde(default)]
    pub social: SocialLinks,
    #[serde(default)]
    pub metadata: Metadata,
}
