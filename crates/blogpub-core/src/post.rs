use crate::error::{BlogError, Result};
use chrono::{Month, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// PostDate
// ---------------------------------------------------------------------------

/// Publication date taken from a post's `YYYY-MM-DD-` filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

static FILENAME_RE: OnceLock<Regex> = OnceLock::new();

fn filename_re() -> &'static Regex {
    FILENAME_RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-.+").unwrap())
}

impl PostDate {
    /// Parse the date prefix of a post filename such as `2021-03-01-hello.md`.
    pub fn from_filename(name: &str) -> Result<Self> {
        let invalid = || BlogError::InvalidPostFilename(name.to_string());
        let caps = filename_re().captures(name).ok_or_else(invalid)?;
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let month: u32 = caps[2].parse().map_err(|_| invalid())?;
        let day: u32 = caps[3].parse().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        Ok(Self { year, month, day })
    }

    /// Four-digit year, as used in archive paths.
    pub fn year_str(&self) -> String {
        format!("{:04}", self.year)
    }

    /// Two-digit month, as used in archive paths.
    pub fn month_str(&self) -> String {
        format!("{:02}", self.month)
    }

    /// English month name (`3` → `March`).
    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// English calendar month name for `1..=12`; empty for anything else.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}

// ---------------------------------------------------------------------------
// PostFile
// ---------------------------------------------------------------------------

/// A dated file in the posts directory. Enough for archive generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFile {
    pub file_name: String,
    pub path: PathBuf,
    pub date: PostDate,
}

/// Result of scanning the posts directory.
#[derive(Debug, Default)]
pub struct PostListing {
    pub posts: Vec<PostFile>,
    /// Entries that were not dated posts (hidden files, drafts, notes).
    pub skipped: Vec<String>,
}

/// List dated posts in `dir`, sorted by file name.
///
/// A missing or unreadable directory is an error; undated entries are skipped.
pub async fn list_posts(dir: &Path) -> Result<PostListing> {
    let mut listing = PostListing::default();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.file_type().await?.is_file() {
            continue;
        }
        match PostDate::from_filename(&name) {
            Ok(date) => listing.posts.push(PostFile {
                path: entry.path(),
                file_name: name,
                date,
            }),
            Err(_) => {
                tracing::warn!(file = %name, "skipping post without a YYYY-MM-DD- prefix");
                listing.skipped.push(name);
            }
        }
    }
    listing.posts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    listing.skipped.sort();
    Ok(listing)
}

// ---------------------------------------------------------------------------
// Front matter
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct PostFrontMatter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
}

/// Extract the YAML content between the first pair of `---` delimiters.
fn extract_front_matter(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content.strip_prefix("---")?;
    let rest = if let Some(r) = rest.strip_prefix('\n') {
        r
    } else if let Some(r) = rest.strip_prefix("\r\n") {
        r
    } else {
        return None;
    };
    if rest.starts_with("---") {
        return Some("");
    }
    let end = rest.find("\n---")?;
    Some(&rest[..end])
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub file_name: String,
    pub date: PostDate,
    pub title: String,
    pub permalink: String,
}

impl Post {
    /// Build a post from a listing entry and the raw document text.
    pub fn parse(file: &PostFile, content: &str) -> Result<Self> {
        let bad = |reason: &str| BlogError::FrontMatter {
            file: file.path.clone(),
            reason: reason.to_string(),
        };
        let fm = extract_front_matter(content).ok_or_else(|| bad("missing --- header"))?;
        let fm: PostFrontMatter = if fm.trim().is_empty() {
            PostFrontMatter::default()
        } else {
            serde_yaml::from_str(fm).map_err(|e| bad(&e.to_string()))?
        };
        let title = fm
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| bad("missing 'title'"))?;
        let permalink = fm
            .permalink
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| bad("missing 'permalink'"))?;
        Ok(Self {
            file_name: file.file_name.clone(),
            date: file.date,
            title,
            permalink,
        })
    }

    pub async fn load(file: &PostFile) -> Result<Self> {
        let content = tokio::fs::read_to_string(&file.path).await?;
        Self::parse(file, &content)
    }
}

/// Read the front matter of every dated post in `dir`.
pub async fn load_posts(dir: &Path) -> Result<Vec<Post>> {
    let listing = list_posts(dir).await?;
    let loaded = futures::future::join_all(listing.posts.iter().map(Post::load)).await;
    loaded.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
