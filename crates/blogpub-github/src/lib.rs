//! `blogpub-github`: the GitHub side of comment linking.
//!
//! [`GithubClient`] opens issues through the REST API and implements
//! [`blogpub_core::linker::IssueTracker`], so the linker never sees HTTP.
//!
//! ```rust,ignore
//! use blogpub_github::GithubClient;
//!
//! let client = GithubClient::new(&config.github, std::env::var("GH_TOKEN").ok())?;
//! let report = blogpub_core::linker::link_comments(&root, &config, &client).await?;
//! ```

pub mod client;
pub mod error;

pub use client::GithubClient;
pub use error::GithubError;
