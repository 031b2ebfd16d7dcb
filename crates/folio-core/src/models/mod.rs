//! Data models for portfolio content.
//!
//! - `Skill`, `SkillCategory`, `SkillGroups`: skills partitioned by category
//! - `Project`, `BlogPost`, `Experience`, `Certification`, `Achievement`:
//!   the remaining remote-backed collections
//! - `ContactMessage`, `NewContactMessage`: contact form submissions
//! - `Portfolio` and its static-only sections (hero, about, education, ...)

pub mod contact;
pub mod content;
pub mod profile;
pub mod skill;

use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

pub use contact::{ContactMessage, NewContactMessage};
pub use content::{Achievement, BlogPost, Certification, Experience, Project};
pub use profile::{About, ContactInfo, Education, Hero, Metadata, Portfolio, SocialLink, SocialLinks};
pub use skill::{Skill, SkillCategory, SkillGroups};

/// Primary key of a backend row. Tables use integer ids, but uuid-keyed
/// tables are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(i) => Value::from(*i),
            RecordId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{}", i),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        id.parse().unwrap_or_else(|_| RecordId::Text(id.to_string()))
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(i) => RecordId::Int(i),
            Err(_) => RecordId::Text(s.trim().to_string()),
        })
    }
}

/// A value that can be shown as a content section, cached, and checked for
/// emptiness.
///
/// Sequences are empty when they have no elements; mappings when they have
/// no keys.
pub trait Content: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn is_empty(&self) -> bool;
}

impl<T> Content for Vec<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Content for Value {
    fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_parsing() {
        assert_eq!("42".parse::<RecordId>().unwrap(), RecordId::Int(42));
        assert_eq!(
            RecordId::from("9f1c-uuid"),
            RecordId::Text("9f1c-uuid".to_string())
        );
        assert_eq!(RecordId::Int(3).to_value(), json!(3));
    }

    #[test]
    fn test_value_emptiness() {
        assert!(Content::is_empty(&json!([])));
        assert!(Content::is_empty(&json!({})));
        assert!(Content::is_empty(&Value::Null));
        assert!(!Content::is_empty(&json!([1])));
        assert!(!Content::is_empty(&json!({"programming": []})));
    }
}
