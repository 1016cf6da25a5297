use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub name: String,
}

/// Tag key → display name, as declared in `_data/tags.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    tags: BTreeMap<String, Tag>,
}

impl TagRegistry {
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let tags: Option<BTreeMap<String, Option<Tag>>> = serde_yaml::from_str(yaml)?;
        let tags = tags
            .unwrap_or_default()
            .into_iter()
            .map(|(key, tag)| (key, tag.unwrap_or_default()))
            .collect();
        Ok(Self { tags })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read_to_string(path).await?;
        Self::parse(&data)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Display name for `key`, falling back to the key itself.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        match self.tags.get(key) {
            Some(tag) if !tag.name.trim().is_empty() => &tag.name,
            _ => key,
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
