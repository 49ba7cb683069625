// Upstream API seam.
// The tree builder and request handlers talk to GitHub only through these traits.

use std::future::Future;

use async_trait::async_trait;

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{
    Branch, Issue, Notification, NotificationQuery, Owner, PullRequest, RateLimit, Repository,
    Runner, Workflow, WorkflowRun,
};

/// Page size used when walking repository listings.
pub const REPOS_PER_PAGE: u32 = 100;

/// Operations the rest of the crate needs from the GitHub REST API.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Organizations the authenticated identity belongs to.
    async fn user_orgs(&self) -> Result<Vec<Owner>>;

    /// One page of repositories owned by the authenticated identity.
    async fn own_repos_page(&self, page: u32, per_page: u32) -> Result<Vec<Repository>>;

    /// One page of an organization's repositories. 404 when `org` is not an organization.
    async fn org_repos_page(&self, org: &str, page: u32, per_page: u32)
    -> Result<Vec<Repository>>;

    /// One page of a user's public repositories.
    async fn user_repos_page(
        &self,
        user: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>>;

    async fn workflows(&self, owner: &str, repo: &str) -> Result<Vec<Workflow>>;

    /// Most recent completed runs across all workflows of a repository.
    async fn recent_runs(&self, owner: &str, repo: &str, per_page: u32)
    -> Result<Vec<WorkflowRun>>;

    /// Self-hosted runners (requires admin access to the repository).
    async fn runners(&self, owner: &str, repo: &str) -> Result<Vec<Runner>>;

    async fn branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>>;

    /// Pull requests in all states, most recently updated first.
    async fn pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>>;

    /// Issues in all states, most recently updated first. Includes pull requests.
    async fn issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>>;

    async fn notifications(&self, query: &NotificationQuery) -> Result<Vec<Notification>>;

    /// Best-effort estimate of unread notification threads.
    async fn unread_notification_count(&self) -> Result<u64>;

    async fn mark_thread_read(&self, thread_id: &str) -> Result<()>;

    async fn mark_all_notifications_read(&self) -> Result<()>;

    /// Core REST bucket of the rate limit.
    async fn rate_limit(&self) -> Result<RateLimit>;
}

/// Builds one upstream client per top-level call.
pub trait Connector: Send + Sync {
    type Client: GitHubApi;

    fn connect(&self, token: &str, api_url: Option<&str>) -> Result<Self::Client>;
}

/// Connector producing real HTTP clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    type Client = GitHubClient;

    fn connect(&self, token: &str, api_url: Option<&str>) -> Result<GitHubClient> {
        GitHubClient::new(token, api_url)
    }
}

/// Fetch pages starting at 1 until a short or empty page signals the end.
pub async fn collect_pages<T, F, Fut>(per_page: u32, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let batch = fetch_page(page).await?;
        let len = batch.len();
        items.extend(batch);

        if len < per_page as usize {
            break;
        }
        page += 1;
    }

    Ok(items)
}
