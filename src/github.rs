use crate::config::GitHubConfig;
use reqwest::{StatusCode, header};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Repositories returned by the repos endpoint
pub const REPO_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("invalid GitHub API base URL: {0}")]
    InvalidBase(#[from] url::ParseError),
    #[error("GitHub request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("GitHub responded with {0}")]
    Status(StatusCode),
    #[error("GitHub user has no avatar_url")]
    MissingAvatar,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    avatar_url: Option<String>,
}

/// Client for the two GitHub REST calls profiles need
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let base = Url::parse(&config.api_base)?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base,
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    /// `GET /users/{username}` -> `avatar_url`
    pub async fn avatar_url(&self, username: &str) -> Result<String, GitHubError> {
        let url = self.endpoint(&["users", username]);
        debug!(%url, "Fetching GitHub avatar");

        let user: GitHubUser = self.get(url).await?.json().await?;
        user.avatar_url
            .filter(|u| !u.is_empty())
            .ok_or(GitHubError::MissingAvatar)
    }

    /// Most recently created public repositories, passed through as returned
    pub async fn latest_repos(&self, username: &str) -> Result<serde_json::Value, GitHubError> {
        let mut url = self.endpoint(&["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", &REPO_LIMIT.to_string())
            .append_pair("sort", "created")
            .append_pair("direction", "desc");
        debug!(%url, "Fetching GitHub repos");

        Ok(self.get(url).await?.json().await?)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot-be-a-base URLs are rejected by Url::parse for http(s)
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, GitHubError> {
        let mut request = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(GitHubError::Status(response.status()));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> GitHubClient {
        GitHubClient::new(&GitHubConfig {
            api_base: server.uri(),
            token: token.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_avatar_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .and(header("authorization", "token ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "login": "octocat",
                "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let avatar = client(&server, Some("ghp_test"))
            .avatar_url("octocat")
            .await
            .unwrap();
        assert_eq!(avatar, "https://avatars.githubusercontent.com/u/583231?v=4");
    }

    #[tokio::test]
    async fn unknown_user_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server, None).avatar_url("ghost").await.unwrap_err();
        assert!(matches!(err, GitHubError::Status(StatusCode::NOT_FOUND)));
    }

    #[tokio::test]
    async fn missing_avatar_field_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/bare"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = client(&server, None).avatar_url("bare").await.unwrap_err();
        assert!(matches!(err, GitHubError::MissingAvatar));
    }

    #[tokio::test]
    async fn repos_request_asks_for_newest_five() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("per_page", "5"))
            .and(query_param("sort", "created"))
            .and(query_param("direction", "desc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "name": "hello-world" }])),
            )
            .mount(&server)
            .await;

        let repos = client(&server, None).latest_repos("octocat").await.unwrap();
        assert_eq!(repos[0]["name"], "hello-world");
    }

    #[test]
    fn username_is_a_single_encoded_segment() {
        let config = GitHubConfig::default();
        let client = GitHubClient::new(&config).unwrap();
        let url = client.endpoint(&["users", "../admin"]);
        assert_eq!(url.as_str(), "https://api.github.com/users/..%2Fadmin");
    }
}
