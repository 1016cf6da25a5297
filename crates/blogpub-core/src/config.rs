use crate::error::{BlogError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SiteConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public URL of the blog, without a trailing slash (e.g. `https://example.com`).
    pub root: String,
}

// ---------------------------------------------------------------------------
// GithubConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

// ---------------------------------------------------------------------------
// GitConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_commit_message() -> String {
    "[ci skip] automated tag and archive page generation".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            branch: default_branch(),
            commit_message: default_commit_message(),
            author_name: None,
            author_email: None,
        }
    }
}

// ---------------------------------------------------------------------------
// PathsConfig
// ---------------------------------------------------------------------------

/// Locations of inputs and outputs, relative to the blog root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_posts")]
    pub posts: String,
    #[serde(default = "default_tags_file")]
    pub tags_file: String,
    #[serde(default = "default_comment_links")]
    pub comment_links: String,
    #[serde(default = "default_tags_dir")]
    pub tags_dir: String,
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,
    #[serde(default = "default_credentials")]
    pub credentials: String,
}

fn default_posts() -> String {
    paths::POSTS_DIR.to_string()
}

fn default_tags_file() -> String {
    paths::TAGS_FILE.to_string()
}

fn default_comment_links() -> String {
    paths::COMMENT_LINKS_FILE.to_string()
}

fn default_tags_dir() -> String {
    paths::TAGS_DIR.to_string()
}

fn default_archive_dir() -> String {
    paths::ARCHIVE_DIR.to_string()
}

fn default_credentials() -> String {
    paths::CREDENTIALS_FILE.to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            posts: default_posts(),
            tags_file: default_tags_file(),
            comment_links: default_comment_links(),
            tags_dir: default_tags_dir(),
            archive_dir: default_archive_dir(),
            credentials: default_credentials(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub github: GithubConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    pub fn new(
        site_root: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            site: SiteConfig {
                root: site_root.into(),
            },
            github: GithubConfig {
                owner: owner.into(),
                repo: repo.into(),
                api_base: default_api_base(),
                labels: Vec::new(),
                timeout_secs: default_timeout_secs(),
            },
            git: GitConfig::default(),
            paths: PathsConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(BlogError::NotConfigured);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let site_root = self.site.root.trim();
        if site_root.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "site.root is empty".to_string(),
            });
        } else if !(site_root.starts_with("http://") || site_root.starts_with("https://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("site.root '{site_root}' is not an http(s) URL"),
            });
        }
        // Permalinks start with '/', so a trailing slash doubles it in issue bodies.
        if site_root.ends_with('/') {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("site.root '{site_root}' ends with '/'"),
            });
        }

        if self.github.owner.trim().is_empty() || self.github.repo.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "github.owner and github.repo must both be set".to_string(),
            });
        }

        if self.github.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "github.timeout_secs is 0; every request will time out".to_string(),
            });
        }

        if self.git.author_name.is_some() != self.git.author_email.is_some() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "git.author_name and git.author_email should be set together"
                    .to_string(),
            });
        }

        if self.git.commit_message.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "git.commit_message is empty".to_string(),
            });
        }

        let credentials = Path::new(&self.paths.credentials);
        if credentials.is_relative() && !paths::is_private_to_git(Path::new(""), credentials) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "paths.credentials '{}' would be committed; keep it under .git/",
                    self.paths.credentials
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
