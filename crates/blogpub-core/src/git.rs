use crate::error::{BlogError, Result};
use crate::io;
use crate::paths;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// The working-tree operations publishing needs.
pub trait VersionControl {
    fn is_clean(&self) -> impl Future<Output = Result<bool>> + Send;
    /// Make `token` available to later pushes.
    fn configure_credentials(&self, token: &str) -> impl Future<Output = Result<()>> + Send;
    fn set_identity(&self, name: &str, email: &str) -> impl Future<Output = Result<()>> + Send;
    fn stage_all(&self) -> impl Future<Output = Result<()>> + Send;
    fn commit(&self, message: &str) -> impl Future<Output = Result<()>> + Send;
    fn push(&self, remote: &str, branch: &str) -> impl Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// GitCli
// ---------------------------------------------------------------------------

/// [`VersionControl`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    git: PathBuf,
    repo: PathBuf,
    credentials: PathBuf,
}

impl GitCli {
    /// Locate `git` on PATH. `credentials` is the store file used by
    /// [`VersionControl::configure_credentials`]; it is refused when `add -A`
    /// would stage it.
    pub fn new(repo: &Path, credentials: &Path) -> Result<Self> {
        if !paths::is_private_to_git(repo, credentials) {
            return Err(BlogError::UnsafeCredentialsPath(credentials.to_path_buf()));
        }
        let git = which::which("git").map_err(|_| BlogError::GitNotInstalled)?;
        Ok(Self {
            git,
            repo: repo.to_path_buf(),
            credentials: credentials.to_path_buf(),
        })
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(args = ?args, "running git");
        let output = Command::new(&self.git)
            .args(args)
            .current_dir(&self.repo)
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BlogError::Git {
                command: args.join(" "),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl VersionControl for GitCli {
    async fn is_clean(&self) -> Result<bool> {
        let status = self.run(&["status", "--porcelain"]).await?;
        Ok(status.trim().is_empty())
    }

    async fn configure_credentials(&self, token: &str) -> Result<()> {
        let helper = format!("store --file={}", self.credentials.display());
        self.run(&["config", "credential.helper", helper.as_str()]).await?;
        io::write_private(
            &self.credentials,
            format!("https://{token}:@github.com\n").into_bytes(),
        )
        .await
    }

    async fn set_identity(&self, name: &str, email: &str) -> Result<()> {
        self.run(&["config", "user.name", name]).await?;
        self.run(&["config", "user.email", email]).await?;
        Ok(())
    }

    async fn stage_all(&self) -> Result<()> {
        self.run(&["add", "-A"]).await.map(drop)
    }

    async fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).await.map(drop)
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["push", remote, branch]).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Returns `None` when git is not installed so the test can bail out.
    async fn repo() -> Option<(TempDir, GitCli)> {
        let dir = TempDir::new().unwrap();
        let git = GitCli::new(dir.path(), &dir.path().join(".git/credentials")).ok()?;
        git.run(&["init", "--quiet"]).await.unwrap();
        git.run(&["config", "commit.gpgsign", "false"]).await.unwrap();
        git.set_identity("Test", "test@example.com").await.unwrap();
        Some((dir, git))
    }

    #[tokio::test]
    async fn fresh_repo_is_clean_until_a_file_appears() {
        let Some((dir, git)) = repo().await else {
            return;
        };
        assert!(git.is_clean().await.unwrap());

        std::fs::create_dir_all(dir.path().join("tags")).unwrap();
        std::fs::write(dir.path().join("tags/go.md"), "---\ntag: go\n---\n").unwrap();
        assert!(!git.is_clean().await.unwrap());

        git.stage_all().await.unwrap();
        git.commit("[ci skip] automated tag and archive page generation")
            .await
            .unwrap();
        assert!(git.is_clean().await.unwrap());
    }

    #[tokio::test]
    async fn credentials_file_holds_token() {
        let Some((dir, git)) = repo().await else {
            return;
        };
        git.configure_credentials("s3cret").await.unwrap();
        let stored = std::fs::read_to_string(dir.path().join(".git/credentials")).unwrap();
        assert_eq!(stored, "https://s3cret:@github.com\n");
        let helper = git.run(&["config", "credential.helper"]).await.unwrap();
        assert!(helper.trim().starts_with("store --file="));
    }

    #[tokio::test]
    async fn push_without_remote_fails_with_git_error() {
        let Some((_dir, git)) = repo().await else {
            return;
        };
        let err = git.push("origin", "master").await.unwrap_err();
        assert!(matches!(err, BlogError::Git { .. }));
    }

    #[test]
    fn credential_store_in_working_tree_is_refused() {
        let dir = TempDir::new().unwrap();
        let err = GitCli::new(dir.path(), &dir.path().join("credentials")).unwrap_err();
        assert!(matches!(err, BlogError::UnsafeCredentialsPath(_)));
        assert!(!dir.path().join("credentials").exists());
    }

    #[tokio::test]
    async fn stored_credentials_are_never_staged() {
        let Some((_dir, git)) = repo().await else {
            return;
        };
        git.configure_credentials("s3cret").await.unwrap();
        assert!(git.is_clean().await.unwrap());
    }
}
