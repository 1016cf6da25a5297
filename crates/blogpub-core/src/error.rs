use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("not configured: create _publish.yml in the blog root")]
    NotConfigured,

    #[error("invalid post filename '{0}': expected a YYYY-MM-DD- prefix")]
    InvalidPostFilename(String),

    #[error("invalid front matter in {}: {reason}", file.display())]
    FrontMatter { file: PathBuf, reason: String },

    #[error("issue tracker error: {0}")]
    IssueTracker(String),

    #[error("failed to create {failed} comment issue(s) ({created} created and recorded): {first_error}")]
    IssueCreation {
        failed: usize,
        created: usize,
        first_error: String,
    },

    #[error("no GitHub token: set GH_TOKEN")]
    MissingToken,

    #[error("git executable not found on PATH")]
    GitNotInstalled,

    #[error("credential store {} must live under .git/ or outside the working tree", .0.display())]
    UnsafeCredentialsPath(PathBuf),

    #[error("`git {command}` failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BlogError>;
