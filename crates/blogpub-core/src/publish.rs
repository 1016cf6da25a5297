//! Generate, link, and push the result.
//!
//! ```text
//! Idle → Generating → Linking → CheckingStatus ─┬─ clean ─→ Done
//!                                               └─ dirty ─→ Authenticating → Staging → Committing → Pushing → Done
//! ```
//!
//! Any error moves straight to `Failed`; nothing already done is rolled back.

use crate::config::Config;
use crate::error::Result;
use crate::generate::{self, GenerateReport};
use crate::git::VersionControl;
use crate::linker::{self, IssueTracker, LinkReport};
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishState {
    Idle,
    Generating,
    Linking,
    CheckingStatus,
    Authenticating,
    Staging,
    Committing,
    Pushing,
    Done,
    Failed,
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PublishState::Idle => "idle",
            PublishState::Generating => "generating",
            PublishState::Linking => "linking",
            PublishState::CheckingStatus => "checking_status",
            PublishState::Authenticating => "authenticating",
            PublishState::Staging => "staging",
            PublishState::Committing => "committing",
            PublishState::Pushing => "pushing",
            PublishState::Done => "done",
            PublishState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub generate: GenerateReport,
    pub link: LinkReport,
    /// `false` when the tree was clean and nothing was pushed.
    pub committed: bool,
}

/// Run every stage in order. `token` is written to the git credential store
/// before pushing; without it the push uses whatever credentials git already has.
pub async fn publish<T, V>(
    root: &Path,
    config: &Config,
    tracker: &T,
    vcs: &V,
    token: Option<&str>,
) -> Result<PublishOutcome>
where
    T: IssueTracker,
    V: VersionControl,
{
    let mut state = PublishState::Idle;
    let result = drive(root, config, tracker, vcs, token, &mut state).await;
    match &result {
        Ok(outcome) => {
            tracing::info!(committed = outcome.committed, "publish finished");
        }
        Err(e) => {
            tracing::error!(stage = %state, error = %e, "publish failed");
            enter(&mut state, PublishState::Failed);
        }
    }
    result
}

fn enter(state: &mut PublishState, next: PublishState) {
    tracing::info!(from = %state, to = %next, "publish stage");
    *state = next;
}

async fn drive<T, V>(
    root: &Path,
    config: &Config,
    tracker: &T,
    vcs: &V,
    token: Option<&str>,
    state: &mut PublishState,
) -> Result<PublishOutcome>
where
    T: IssueTracker,
    V: VersionControl,
{
    enter(state, PublishState::Generating);
    let generate = generate::generate(root, config).await?;

    enter(state, PublishState::Linking);
    let link = linker::link_comments(root, config, tracker).await?;

    enter(state, PublishState::CheckingStatus);
    if vcs.is_clean().await? {
        tracing::info!("working tree clean; nothing to publish");
        enter(state, PublishState::Done);
        return Ok(PublishOutcome {
            generate,
            link,
            committed: false,
        });
    }

    enter(state, PublishState::Authenticating);
    match token {
        Some(token) => vcs.configure_credentials(token).await?,
        None => tracing::warn!("no token; pushing with existing git credentials"),
    }
    if let (Some(name), Some(email)) = (&config.git.author_name, &config.git.author_email) {
        vcs.set_identity(name, email).await?;
    }

    enter(state, PublishState::Staging);
    vcs.stage_all().await?;

    enter(state, PublishState::Committing);
    vcs.commit(&config.git.commit_message).await?;

    enter(state, PublishState::Pushing);
    vcs.push(&config.git.remote, &config.git.branch).await?;

    enter(state, PublishState::Done);
    Ok(PublishOutcome {
        generate,
        link,
        committed: true,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
