use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Content, RecordId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    /// Proficiency from 0 to 100
    pub level: u8,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Known skill buckets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Programming,
    Frameworks,
    Databases,
    Tools,
    Concepts,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 5] = [
        SkillCategory::Programming,
        SkillCategory::Frameworks,
        SkillCategory::Databases,
        SkillCategory::Tools,
        SkillCategory::Concepts,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SkillCategory::Programming => "programming",
            SkillCategory::Frameworks => "frameworks",
            SkillCategory::Databases => "databases",
            SkillCategory::Tools => "tools",
            SkillCategory::Concepts => "concepts",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            SkillCategory::Programming => "Programming",
            SkillCategory::Frameworks => "Frameworks",
            SkillCategory::Databases => "Databases",
            SkillCategory::Tools => "Tools",
            SkillCategory::Concepts => "Concepts",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Skills partitioned by category. Only categories holding at least one
/// skill are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillGroups(BTreeMap<SkillCategory, Vec<Skill>>);

impl SkillGroups {
    /// Group flat skill rows by their `category` column, keeping row order
    /// within each bucket. Rows with an unknown category are dropped.
    pub fn from_rows(rows: Vec<Skill>) -> Self {
        let mut groups: BTreeMap<SkillCategory, Vec<Skill>> = BTreeMap::new();
        for skill in rows {
            match SkillCategory::from_key(&skill.category) {
                Some(category) => groups.entry(category).or_default().push(skill),
                None => warn!(skill = %skill.name, category = %skill.category, "Skipping skill with unknown category"),
            }
        }
        Self(groups)
    }

    pub fn get(&self, category: SkillCategory) -> &[Skill] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = SkillCategory> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillCategory, &[Skill])> {
        self.0.iter().map(|(c, s)| (*c, s.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl Content for SkillGroups {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
