use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Remote-backed content collections served through the dual-mode loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Skills,
    Projects,
    Experience,
    Certifications,
    Achievements,
    Blogs,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Skills,
        Resource::Projects,
        Resource::Experience,
        Resource::Certifications,
        Resource::Achievements,
        Resource::Blogs,
    ];

    /// Cache key, unique per resource.
    pub fn key(&self) -> &'static str {
        match self {
            Resource::Skills => "skills",
            Resource::Projects => "projects",
            Resource::Experience => "experience",
            Resource::Certifications => "certifications",
            Resource::Achievements => "achievements",
            Resource::Blogs => "blogs",
        }
    }

    /// Backend table holding the resource's rows.
    pub fn table(&self) -> &'static str {
        // Keys and table names coincide today
        self.key()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Resource::Skills => "Skills",
            Resource::Projects => "Projects",
            Resource::Experience => "Experience",
            Resource::Certifications => "Certifications",
            Resource::Achievements => "Achievements",
            Resource::Blogs => "Blog",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.key() == wanted || (wanted == "blog" && *r == Resource::Blogs))
            .ok_or_else(|| {
                let names: Vec<&str> = Resource::ALL.iter().map(Resource::key).collect();
                format!("Unknown resource '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<&str> = Resource::ALL.iter().map(Resource::key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Resource::ALL.len());
    }

    #[test]
    fn test_parse() {
        assert_eq!("Projects".parse::<Resource>(), Ok(Resource::Projects));
        assert_eq!("blog".parse::<Resource>(), Ok(Resource::Blogs));
        assert!("hero".parse::<Resource>().unwrap_err().contains("expected one of"));
    }
}
