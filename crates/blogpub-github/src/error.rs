use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("no GitHub token configured: set GH_TOKEN")]
    MissingToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl From<GithubError> for blogpub_core::BlogError {
    fn from(e: GithubError) -> Self {
        match e {
            GithubError::MissingToken => blogpub_core::BlogError::MissingToken,
            other => blogpub_core::BlogError::IssueTracker(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GithubError>;
