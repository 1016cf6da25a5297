//! Comment-issue linking: one tracking issue per post, recorded by permalink.

use crate::comment_links::{self, CommentLinks};
use crate::config::Config;
use crate::error::{BlogError, Result};
use crate::post::{self, Post};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::path::Path;

// ---------------------------------------------------------------------------
// IssueTracker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Something that can open an issue and hand back its number.
pub trait IssueTracker {
    fn create_issue(&self, issue: &NewIssue) -> impl Future<Output = Result<u64>> + Send;
}

/// The issue opened for `post`.
pub fn issue_for(post: &Post, config: &Config) -> NewIssue {
    let site_root = &config.site.root;
    NewIssue {
        title: post.title.clone(),
        body: format!(
            "Auto-generated issue to track comments for the post [{title}]({site_root}{permalink}) in my [blog]({site_root}).",
            title = post.title,
            permalink = post.permalink,
        ),
        labels: config.github.labels.clone(),
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedLink {
    pub permalink: String,
    pub issue: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkReport {
    pub examined: usize,
    pub already_linked: usize,
    pub created: Vec<CreatedLink>,
}

/// Posts whose permalink is not in `links`, at most one per permalink.
pub fn unlinked_posts<'a>(posts: &'a [Post], links: &CommentLinks) -> Vec<&'a Post> {
    let mut seen = HashSet::new();
    let mut unlinked = Vec::new();
    for post in posts {
        if links.contains(&post.permalink) {
            continue;
        }
        if !seen.insert(post.permalink.as_str()) {
            tracing::warn!(
                file = %post.file_name,
                permalink = %post.permalink,
                "permalink shared with another post; linking it once"
            );
            continue;
        }
        unlinked.push(post);
    }
    unlinked
}

// ---------------------------------------------------------------------------
// Linking
// ---------------------------------------------------------------------------

/// Open an issue for every post that has none yet and record the new links.
///
/// With nothing to link no tracker call and no file write happen. Issues that
/// were created are recorded even when others fail, and the run then fails
/// with [`BlogError::IssueCreation`].
pub async fn link_comments<T: IssueTracker>(
    root: &Path,
    config: &Config,
    tracker: &T,
) -> Result<LinkReport> {
    let table_path = root.join(&config.paths.comment_links);
    let links = CommentLinks::load(&table_path).await?;
    let posts = post::load_posts(&root.join(&config.paths.posts)).await?;
    let unlinked = unlinked_posts(&posts, &links);

    let mut report = LinkReport {
        examined: posts.len(),
        already_linked: posts
            .iter()
            .filter(|p| links.contains(&p.permalink))
            .count(),
        created: Vec::new(),
    };

    if unlinked.is_empty() {
        tracing::info!(posts = posts.len(), "every post already has a comment issue");
        return Ok(report);
    }

    tracing::info!(count = unlinked.len(), "creating comment issues");

    let results = join_all(unlinked.iter().map(|post| async move {
        let issue = issue_for(post, config);
        (*post, tracker.create_issue(&issue).await)
    }))
    .await;

    let mut failures = Vec::new();
    for (post, result) in results {
        match result {
            Ok(number) => {
                tracing::info!(permalink = %post.permalink, issue = number, "created comment issue");
                report.created.push(CreatedLink {
                    permalink: post.permalink.clone(),
                    issue: number,
                });
            }
            Err(e) => {
                tracing::error!(permalink = %post.permalink, error = %e, "failed to create comment issue");
                failures.push(e.to_string());
            }
        }
    }

    let pairs = report
        .created
        .iter()
        .map(|l| (l.permalink.clone(), l.issue))
        .collect();
    comment_links::merge_into_file(&table_path, pairs).await?;

    if let Some(first_error) = failures.first() {
        return Err(BlogError::IssueCreation {
            failed: failures.len(),
            created: report.created.len(),
            first_error: first_error.clone(),
        });
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
