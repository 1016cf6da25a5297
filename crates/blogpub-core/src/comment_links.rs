use crate::error::Result;
use crate::io;
use std::collections::BTreeMap;
use std::path::Path;

/// Persisted permalink → issue number table (`_data/commentrefs.yml`).
///
/// Entries are only ever added. Once a permalink has an issue number it keeps
/// it, which is what stops a later run from opening a second issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentLinks {
    links: BTreeMap<String, u64>,
}

impl CommentLinks {
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let links: Option<BTreeMap<String, u64>> = serde_yaml::from_str(yaml)?;
        Ok(Self {
            links: links.unwrap_or_default(),
        })
    }

    /// Load the table; a file that does not exist yet is an empty table.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(data) => Self::parse(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(&self.links)?;
        io::persist(path, data.into_bytes()).await
    }

    pub fn contains(&self, permalink: &str) -> bool {
        self.links.contains_key(permalink)
    }

    pub fn get(&self, permalink: &str) -> Option<u64> {
        self.links.get(permalink).copied()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.links.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Add pairs whose permalink is not yet present. Existing keys keep their
    /// value. Returns how many pairs were added.
    pub fn merge<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let mut added = 0;
        for (permalink, number) in pairs {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.links.entry(permalink) {
                slot.insert(number);
                added += 1;
            } else {
                tracing::warn!(number, "permalink already linked; keeping existing issue");
            }
        }
        added
    }
}

/// Read the current table from disk, add `pairs`, and write it back.
///
/// Re-reading instead of reusing the table loaded at the start of the run keeps
/// entries another tool wrote in the meantime. Nothing is written when
/// `pairs` is empty.
pub async fn merge_into_file(path: &Path, pairs: Vec<(String, u64)>) -> Result<usize> {
    if pairs.is_empty() {
        return Ok(0);
    }
    let mut table = CommentLinks::load(path).await?;
    let added = table.merge(pairs);
    table.save(path).await?;
    Ok(added)
}
