//! Tag and archive index page generation.
//!
//! Every tag in the registry gets `tags/<key>.md` and every (year, month)
//! with at least one post gets `archive/<year>/<month>/index.html`. Pages
//! that already exist are left untouched, so a second run writes nothing.

use crate::config::Config;
use crate::error::Result;
use crate::post::{self, month_name};
use crate::tags::TagRegistry;
use crate::{io, paths};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Partitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePartition {
    pub year: i32,
    pub month: u32,
}

impl ArchivePartition {
    pub fn year_str(&self) -> String {
        format!("{:04}", self.year)
    }

    pub fn month_str(&self) -> String {
        format!("{:02}", self.month)
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }
}

/// Distinct (year, month) pairs across `posts`, in calendar order.
pub fn archive_partitions<'a>(
    posts: impl IntoIterator<Item = &'a post::PostFile>,
) -> BTreeSet<ArchivePartition> {
    posts
        .into_iter()
        .map(|p| ArchivePartition {
            year: p.date.year,
            month: p.date.month,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Double-quoted YAML scalar; JSON string syntax is a subset of it.
fn quoted(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.replace('"', "'")))
}

/// Words YAML 1.1 readers (Jekyll among them) resolve to booleans or null.
const YAML11_WORDS: &[&str] = &[
    "y", "n", "yes", "no", "on", "off", "true", "false", "null", "~",
];

/// `s` left plain when every YAML reader gets the same string back, quoted
/// otherwise. Anything starting like a number is quoted, which also covers
/// YAML 1.1 octals and sexagesimals.
fn scalar(s: &str) -> String {
    let plain = !s.is_empty()
        && s == s.trim()
        && !s.contains('\n')
        && !s.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
        && !YAML11_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w))
        && matches!(
            serde_yaml::from_str::<serde_yaml::Value>(s),
            Ok(serde_yaml::Value::String(ref v)) if v == s
        );
    if plain {
        s.to_string()
    } else {
        quoted(s)
    }
}

pub fn tag_page_content(key: &str, name: &str) -> String {
    format!(
        "---\nlayout: tag\ntitle: {title}\nsummary: {summary}\ntag: {tag}\npermalink: {permalink}\nhidden: true\n---\n",
        title = quoted(name),
        summary = quoted(&format!("Posts tagged with {name}")),
        tag = scalar(key),
        permalink = scalar(&format!("/tags/{key}/")),
    )
}

pub fn archive_page_content(partition: &ArchivePartition) -> String {
    let year = partition.year_str();
    let month = partition.month_str();
    let month_name = partition.month_name();
    format!(
        "---\nlayout: archive\ntitle: {title}\nsummary: {summary}\nyear: '{year}'\nmonth: '{month}'\nmonthName: {month_name}\nhidden: true\n---\n",
        title = quoted(&format!("{month_name} {year}")),
        summary = quoted(&format!("Posts published in {month_name} {year}")),
    )
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    pub tags_written: Vec<PathBuf>,
    pub archives_written: Vec<PathBuf>,
    /// Tag keys that cannot be used as file names.
    pub skipped: Vec<String>,
    pub failures: Vec<WriteFailure>,
}

impl GenerateReport {
    pub fn writes(&self) -> usize {
        self.tags_written.len() + self.archives_written.len()
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

enum Kind {
    Tag,
    Archive,
}

struct Job {
    kind: Kind,
    path: PathBuf,
    content: String,
}

/// Ensure one tag page per registry key and one archive page per month.
///
/// Reading the tag registry or listing the posts directory is fatal. A
/// failure writing one page is logged and recorded in the report; the
/// remaining pages are still written.
pub async fn generate(root: &Path, config: &Config) -> Result<GenerateReport> {
    let registry = TagRegistry::load(&root.join(&config.paths.tags_file)).await?;
    let listing = post::list_posts(&root.join(&config.paths.posts)).await?;
    let partitions = archive_partitions(&listing.posts);

    tracing::debug!(
        tags = registry.len(),
        posts = listing.posts.len(),
        months = partitions.len(),
        "generating index pages"
    );

    let mut report = GenerateReport::default();
    let mut jobs = Vec::with_capacity(registry.len() + partitions.len());

    for key in registry.keys() {
        if !paths::is_safe_file_stem(key) {
            tracing::warn!(tag = %key, "skipping tag key that is not a valid file name");
            report.skipped.push(key.to_string());
            continue;
        }
        jobs.push(Job {
            kind: Kind::Tag,
            path: paths::tag_page(root, &config.paths, key),
            content: tag_page_content(key, registry.display_name(key)),
        });
    }

    for partition in &partitions {
        jobs.push(Job {
            kind: Kind::Archive,
            path: paths::archive_index(
                root,
                &config.paths,
                &partition.year_str(),
                &partition.month_str(),
            ),
            content: archive_page_content(partition),
        });
    }

    let results = join_all(jobs.iter().map(|job| async move {
        (job, io::write_if_missing(&job.path, job.content.as_bytes()).await)
    }))
    .await;

    for (job, result) in results {
        match result {
            Ok(true) => {
                tracing::info!(path = %job.path.display(), "wrote index page");
                match job.kind {
                    Kind::Tag => report.tags_written.push(job.path.clone()),
                    Kind::Archive => report.archives_written.push(job.path.clone()),
                }
            }
            Ok(false) => tracing::debug!(path = %job.path.display(), "index page exists"),
            Err(e) => {
                tracing::warn!(path = %job.path.display(), error = %e, "failed to write index page");
                report.failures.push(WriteFailure {
                    path: job.path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
