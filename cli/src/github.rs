// Copyright (c) 2026 Magpie Review
// SPDX-License-Identifier: AGPL-3.0
//! Thin GitHub API client for fetching pull request diffs.

use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("magpie-review/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitHub authentication failed; check GITHUB_TOKEN")]
    Authentication,

    #[error("pull request not found: {0}")]
    NotFound(String),

    #[error("GitHub rate limit exceeded")]
    RateLimit,

    #[error("GitHub returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

/// Fetches pull request diffs via the REST API.
///
/// The token is optional: public repositories can be read anonymously,
/// at a much lower rate limit.
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self, GitHubError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        token: Option<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Fetches the unified diff for a pull request.
    pub async fn pr_diff(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<String, GitHubError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}", self.base_url);
        tracing::debug!(%url, "fetching pull request diff");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3.diff");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        match status.as_u16() {
            200 => Ok(response.text().await?),
            401 => Err(GitHubError::Authentication),
            403 | 429 => Err(GitHubError::RateLimit),
            404 => Err(GitHubError::NotFound(format!("{owner}/{repo}#{number}"))),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(GitHubError::Api { status: code, body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pr_diff_sends_diff_accept_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octo/widgets/pulls/42")
            .match_header("accept", "application/vnd.github.v3.diff")
            .match_header("authorization", "token secret")
            .with_status(200)
            .with_body("diff --git a/lib.rs b/lib.rs\n")
            .create_async()
            .await;

        let client =
            GitHubClient::with_base_url(Some("secret".into()), server.url()).unwrap();
        let diff = client.pr_diff("octo", "widgets", 42).await.unwrap();

        assert!(diff.starts_with("diff --git"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_anonymous_request_omits_authorization() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octo/widgets/pulls/7")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body("diff --git a/x b/x\n")
            .create_async()
            .await;

        let client = GitHubClient::with_base_url(None, server.url()).unwrap();
        client.pr_diff("octo", "widgets", 7).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_pr_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octo/widgets/pulls/9999")
            .with_status(404)
            .with_body("{\"message\": \"Not Found\"}")
            .create_async()
            .await;

        let client = GitHubClient::with_base_url(None, server.url()).unwrap();
        let err = client.pr_diff("octo", "widgets", 9999).await.unwrap_err();

        assert!(matches!(err, GitHubError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bad_token_maps_to_authentication() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octo/widgets/pulls/1")
            .with_status(401)
            .create_async()
            .await;

        let client =
            GitHubClient::with_base_url(Some("stale".into()), server.url()).unwrap();
        let err = client.pr_diff("octo", "widgets", 1).await.unwrap_err();

        assert!(matches!(err, GitHubError::Authentication));
    }
}
