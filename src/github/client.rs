// GitHub API HTTP client.
// Handles authentication, base URL overrides, timeouts, and status classification.

use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::error::{RepoTreeError, Result};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Upper bound on any single upstream request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub API client bound to one credential and one API base URL.
///
/// Built per top-level call and dropped when the call finishes.
#[derive(Debug)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token.
    ///
    /// `api_url` overrides the public API base (GitHub Enterprise deployments).
    pub fn new(token: &str, api_url: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RepoTreeError::InvalidCredential)?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("repotree/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = api_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(GITHUB_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self { client, base_url })
    }

    /// The API base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    ///
    /// A segment never spans more than one path component: `/` is encoded and
    /// `.` or `..` segments are dropped.
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            RepoTreeError::Config(format!("invalid API URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                RepoTreeError::Config(format!("API URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request to the GitHub API.
    pub async fn get(&self, path: &[&str]) -> Result<Response> {
        let url = self.url(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        check_response(response).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        path: &[&str],
        params: &T,
    ) -> Result<Response> {
        let url = self.url(path)?;
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await?;
        check_response(response).await
    }

    /// Make a PATCH request without a body.
    pub async fn patch(&self, path: &[&str]) -> Result<Response> {
        let url = self.url(path)?;
        debug!(%url, "PATCH");
        let response = self.client.patch(url).send().await?;
        check_response(response).await
    }

    /// Make a PUT request with a JSON body.
    pub async fn put_json<T: serde::Serialize + ?Sized>(
        &self,
        path: &[&str],
        body: &T,
    ) -> Result<Response> {
        let url = self.url(path)?;
        debug!(%url, "PUT");
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await?;
        check_response(response).await
    }
}

/// Read the rate limit reset epoch from response headers.
fn reset_from_headers(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(RepoTreeError::InvalidCredential),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            let reset = reset_from_headers(response.headers());
            Err(RepoTreeError::RateLimitExceeded {
                reset,
                message: response.text().await.unwrap_or_default(),
            })
        }
        status => Err(RepoTreeError::Upstream {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        }),
    }
}
