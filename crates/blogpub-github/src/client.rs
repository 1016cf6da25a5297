use crate::error::{GithubError, Result};
use blogpub_core::config::GithubConfig;
use blogpub_core::linker::{IssueTracker, NewIssue};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_VERSION: &str = "2022-11-28";

#[derive(Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [String],
}

#[derive(Deserialize)]
struct CreatedIssue {
    number: u64,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Issue client for one repository.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    token: Option<String>,
}

impl GithubClient {
    /// The token is only checked when an issue is created, so a run with
    /// nothing to link works without one.
    pub fn new(config: &GithubConfig, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("blogpub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// `POST /repos/{owner}/{repo}/issues`, returning the new issue number.
    pub async fn create(&self, issue: &NewIssue) -> Result<u64> {
        let token = self.token.as_deref().ok_or(GithubError::MissingToken)?;
        let url = format!("{}/repos/{}/{}/issues", self.api_base, self.owner, self.repo);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&CreateIssueRequest {
                title: &issue.title,
                body: &issue.body,
                labels: &issue.labels,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(GithubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let created: CreatedIssue = resp.json().await?;
        tracing::debug!(number = created.number, title = %issue.title, "issue created");
        Ok(created.number)
    }
}

impl IssueTracker for GithubClient {
    async fn create_issue(&self, issue: &NewIssue) -> blogpub_core::Result<u64> {
        Ok(self.create(issue).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(api_base: &str) -> GithubConfig {
        GithubConfig {
            owner: "me".to_string(),
            repo: "me.github.io".to_string(),
            api_base: api_base.to_string(),
            labels: Vec::new(),
            timeout_secs: 5,
        }
    }

    fn foo_issue() -> NewIssue {
        NewIssue {
            title: "Foo".to_string(),
            body: "Auto-generated issue to track comments for the post [Foo](http://example.com/foo/) in my [blog](http://example.com).".to_string(),
            labels: vec!["comments".to_string()],
        }
    }

    #[tokio::test]
    async fn create_posts_issue_and_returns_number() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/me/me.github.io/issues")
            .match_header("authorization", "Bearer t0k")
            .match_header("accept", "application/vnd.github+json")
            .match_body(Matcher::Json(serde_json::json!({
                "title": "Foo",
                "body": foo_issue().body,
                "labels": ["comments"],
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"number": 42, "title": "Foo"}"#)
            .create_async()
            .await;

        let client = GithubClient::new(&config(&server.url()), Some("t0k".to_string())).unwrap();
        let number = client.create(&foo_issue()).await.unwrap();

        assert_eq!(number, 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/repos/me/me.github.io/issues")
            .with_status(401)
            .with_body(r#"{"message": "Bad credentials"}"#)
            .create_async()
            .await;

        let client = GithubClient::new(&config(&server.url()), Some("nope".to_string())).unwrap();
        let err = client.create(&foo_issue()).await.unwrap_err();

        match err {
            GithubError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_token_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = GithubClient::new(&config(&server.url()), Some("  ".to_string())).unwrap();
        let err = client.create_issue(&foo_issue()).await.unwrap_err();

        assert!(matches!(err, blogpub_core::BlogError::MissingToken));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn trailing_slash_in_api_base_is_ignored() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/me/me.github.io/issues")
            .with_status(201)
            .with_body(r#"{"number": 7}"#)
            .create_async()
            .await;

        let base = format!("{}/", server.url());
        let client = GithubClient::new(&config(&base), Some("t".to_string())).unwrap();
        assert_eq!(client.create(&foo_issue()).await.unwrap(), 7);
        mock.assert_async().await;
    }
}
