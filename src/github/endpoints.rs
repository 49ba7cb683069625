// GitHub API endpoint functions.
// Implements the upstream API trait against the GitHub REST API.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::LINK;
use serde::Deserialize;

use crate::error::Result;

use super::api::GitHubApi;
use super::client::GitHubClient;
use super::types::{
    Branch, Issue, Notification, NotificationQuery, Owner, PullRequest, RateLimit, Repository,
    Runner, Workflow, WorkflowRun,
};

/// Page size for notification count probing.
const NOTIFICATIONS_COUNT_PER_PAGE: u32 = 100;

/// Response wrapper for workflows list.
#[derive(Debug, Deserialize)]
struct WorkflowsResponse {
    workflows: Vec<Workflow>,
}

/// Response wrapper for workflow runs list.
#[derive(Debug, Deserialize)]
struct WorkflowRunsResponse {
    workflow_runs: Vec<WorkflowRun>,
}

/// Response wrapper for runners list.
#[derive(Debug, Deserialize)]
struct RunnersResponse {
    runners: Vec<Runner>,
}

/// Response wrapper for `/rate_limit`.
#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
struct RateLimitResources {
    core: RateLimit,
}

fn repo_list_params(page: u32, per_page: u32) -> [(&'static str, String); 4] {
    [
        ("sort", "updated".to_string()),
        ("direction", "desc".to_string()),
        ("page", page.to_string()),
        ("per_page", per_page.to_string()),
    ]
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn user_orgs(&self) -> Result<Vec<Owner>> {
        let response = self.get(&["user", "orgs"]).await?;
        let orgs: Vec<Owner> = response.json().await?;
        Ok(orgs)
    }

    async fn own_repos_page(&self, page: u32, per_page: u32) -> Result<Vec<Repository>> {
        let mut params = repo_list_params(page, per_page).to_vec();
        params.push(("affiliation", "owner".to_string()));
        let response = self.get_with_params(&["user", "repos"], &params).await?;
        let repos: Vec<Repository> = response.json().await?;
        Ok(repos)
    }

    async fn org_repos_page(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>> {
        let response = self
            .get_with_params(
                &["orgs", org, "repos"],
                &repo_list_params(page, per_page),
            )
            .await?;
        let repos: Vec<Repository> = response.json().await?;
        Ok(repos)
    }

    async fn user_repos_page(
        &self,
        user: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>> {
        let response = self
            .get_with_params(
                &["users", user, "repos"],
                &repo_list_params(page, per_page),
            )
            .await?;
        let repos: Vec<Repository> = response.json().await?;
        Ok(repos)
    }

    async fn workflows(&self, owner: &str, repo: &str) -> Result<Vec<Workflow>> {
        let params = [("per_page", "100")];
        let response = self
            .get_with_params(
                &["repos", owner, repo, "actions", "workflows"],
                &params,
            )
            .await?;
        let wrapper: WorkflowsResponse = response.json().await?;
        Ok(wrapper.workflows)
    }

    async fn recent_runs(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<Vec<WorkflowRun>> {
        let params = [
            ("per_page", per_page.to_string()),
            ("status", "completed".to_string()),
        ];
        let response = self
            .get_with_params(&["repos", owner, repo, "actions", "runs"], &params)
            .await?;
        let wrapper: WorkflowRunsResponse = response.json().await?;
        Ok(wrapper.workflow_runs)
    }

    async fn runners(&self, owner: &str, repo: &str) -> Result<Vec<Runner>> {
        let response = self
            .get(&["repos", owner, repo, "actions", "runners"])
            .await?;
        let wrapper: RunnersResponse = response.json().await?;
        Ok(wrapper.runners)
    }

    async fn branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>> {
        let params = [("per_page", "100")];
        let response = self
            .get_with_params(&["repos", owner, repo, "branches"], &params)
            .await?;
        let branches: Vec<Branch> = response.json().await?;
        Ok(branches)
    }

    async fn pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>> {
        let params = [
            ("state", "all"),
            ("sort", "updated"),
            ("direction", "desc"),
            ("per_page", "50"),
        ];
        let response = self
            .get_with_params(&["repos", owner, repo, "pulls"], &params)
            .await?;
        let pulls: Vec<PullRequest> = response.json().await?;
        Ok(pulls)
    }

    async fn issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>> {
        let params = [
            ("state", "all"),
            ("sort", "updated"),
            ("direction", "desc"),
            ("per_page", "50"),
        ];
        let response = self
            .get_with_params(&["repos", owner, repo, "issues"], &params)
            .await?;
        let issues: Vec<Issue> = response.json().await?;
        Ok(issues)
    }

    async fn notifications(&self, query: &NotificationQuery) -> Result<Vec<Notification>> {
        let mut params = vec![
            ("all", query.all.to_string()),
            ("participating", query.participating.to_string()),
            ("page", query.page.max(1).to_string()),
            ("per_page", query.per_page.clamp(1, 100).to_string()),
        ];
        if let Some(since) = &query.since {
            params.push(("since", since.clone()));
        }
        if let Some(before) = &query.before {
            params.push(("before", before.clone()));
        }

        let response = self.get_with_params(&["notifications"], &params).await?;
        let notifications: Vec<Notification> = response.json().await?;
        Ok(notifications)
    }

    async fn unread_notification_count(&self) -> Result<u64> {
        let per_page = NOTIFICATIONS_COUNT_PER_PAGE.to_string();
        let first = self
            .get_with_params(
                &["notifications"],
                &[("all", "false"), ("per_page", per_page.as_str())],
            )
            .await?;

        let last_page = first
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(last_page_from_link);

        match last_page {
            Some(last_page) if last_page > 1 => {
                let page = last_page.to_string();
                let last = self
                    .get_with_params(
                        &["notifications"],
                        &[
                            ("all", "false"),
                            ("page", page.as_str()),
                            ("per_page", per_page.as_str()),
                        ],
                    )
                    .await?;
                let items: Vec<serde_json::Value> = last.json().await?;
                Ok(estimate_total(
                    last_page,
                    items.len(),
                    NOTIFICATIONS_COUNT_PER_PAGE,
                ))
            }
            _ => {
                let items: Vec<serde_json::Value> = first.json().await?;
                Ok(items.len() as u64)
            }
        }
    }

    async fn mark_thread_read(&self, thread_id: &str) -> Result<()> {
        self.patch(&["notifications", "threads", thread_id])
            .await?;
        Ok(())
    }

    async fn mark_all_notifications_read(&self) -> Result<()> {
        self.put_json(&["notifications"], &serde_json::json!({ "read": true }))
            .await?;
        Ok(())
    }

    async fn rate_limit(&self) -> Result<RateLimit> {
        let response = self.get(&["rate_limit"]).await?;
        let wrapper: RateLimitResponse = response.json().await?;
        Ok(wrapper.resources.core)
    }
}

/// Extract the `page` number of the `rel="last"` entry of a `Link` header.
fn last_page_from_link(header: &str) -> Option<u32> {
    header
        .split(',')
        .find(|part| part.contains("rel=\"last\""))
        .and_then(|part| {
            let start = part.find('<')? + 1;
            let end = part.find('>')?;
            Url::parse(part.get(start..end)?).ok()
        })
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
        })
}

/// Full pages before the last one plus whatever the last page holds.
fn estimate_total(last_page: u32, items_on_last_page: usize, per_page: u32) -> u64 {
    u64::from(last_page.saturating_sub(1)) * u64::from(per_page) + items_on_last_page as u64
}
