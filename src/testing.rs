// In-memory GitHub double for builder and router tests.
// Records every upstream call so tests can assert on request volume and order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{RepoTreeError, Result};
use crate::github::{
    Branch, Connector, GitHubApi, Issue, Notification, NotificationQuery, Owner, OwnerType,
    PullRequest, RateLimit, Repository, Runner, RunnerStatus, RunConclusion, RunStatus, Workflow,
    WorkflowRun, WorkflowState,
};

/// Fake upstream. Data is keyed by login or by `owner/repo`.
///
/// A login missing from `org_repos` answers 404, like GitHub does for users.
#[derive(Debug, Clone, Default)]
pub struct FakeGitHub {
    pub orgs: Vec<Owner>,
    pub own_repos: Vec<Repository>,
    pub org_repos: HashMap<String, Vec<Repository>>,
    pub user_repos: HashMap<String, Vec<Repository>>,
    pub workflows: HashMap<String, Vec<Workflow>>,
    pub runs: HashMap<String, Vec<WorkflowRun>>,
    pub runners: HashMap<String, Vec<Runner>>,
    pub branches: HashMap<String, Vec<Branch>>,
    pub pulls: HashMap<String, Vec<PullRequest>>,
    pub issues: HashMap<String, Vec<Issue>>,
    pub notifications: Vec<Notification>,
    pub rate_limit: RateLimit,
    /// Call key (e.g. `runners:acme/a`) to the HTTP status it fails with.
    pub failures: HashMap<String, u16>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(mut self, key: &str, status: u16) -> Self {
        self.failures.insert(key.to_string(), status);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, key: String) -> Result<()> {
        self.calls.lock().unwrap().push(key.clone());
        match self.failures.get(&key) {
            Some(&status) => Err(status_error(status)),
            None => Ok(()),
        }
    }

    fn repo_list<T: Clone>(map: &HashMap<String, Vec<T>>, owner: &str, repo: &str) -> Vec<T> {
        map.get(&format!("{}/{}", owner, repo))
            .cloned()
            .unwrap_or_default()
    }
}

/// Build the error the real client produces for `status`.
pub fn status_error(status: u16) -> RepoTreeError {
    match status {
        401 => RepoTreeError::InvalidCredential,
        403 | 429 => RepoTreeError::RateLimitExceeded {
            reset: Some(1_700_000_000),
            message: "API rate limit exceeded".to_string(),
        },
        status => RepoTreeError::Upstream {
            status,
            message: "fake failure".to_string(),
        },
    }
}

fn page_of<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
    let start = (page.saturating_sub(1) * per_page) as usize;
    items
        .iter()
        .skip(start)
        .take(per_page as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn user_orgs(&self) -> Result<Vec<Owner>> {
        self.record("user_orgs".to_string())?;
        Ok(self.orgs.clone())
    }

    async fn own_repos_page(&self, page: u32, per_page: u32) -> Result<Vec<Repository>> {
        self.record(format!("own_repos:{}", page))?;
        Ok(page_of(&self.own_repos, page, per_page))
    }

    async fn org_repos_page(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>> {
        self.record(format!("org_repos:{}:{}", org, page))?;
        match self.org_repos.get(org) {
            Some(repos) => Ok(page_of(repos, page, per_page)),
            None => Err(status_error(404)),
        }
    }

    async fn user_repos_page(
        &self,
        user: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>> {
        self.record(format!("user_repos:{}:{}", user, page))?;
        match self.user_repos.get(user) {
            Some(repos) => Ok(page_of(repos, page, per_page)),
            None => Err(status_error(404)),
        }
    }

    async fn workflows(&self, owner: &str, repo: &str) -> Result<Vec<Workflow>> {
        self.record(format!("workflows:{}/{}", owner, repo))?;
        Ok(Self::repo_list(&self.workflows, owner, repo))
    }

    async fn recent_runs(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<Vec<WorkflowRun>> {
        self.record(format!("runs:{}/{}", owner, repo))?;
        let runs = Self::repo_list(&self.runs, owner, repo);
        Ok(page_of(&runs, 1, per_page))
    }

    async fn runners(&self, owner: &str, repo: &str) -> Result<Vec<Runner>> {
        self.record(format!("runners:{}/{}", owner, repo))?;
        Ok(Self::repo_list(&self.runners, owner, repo))
    }

    async fn branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>> {
        self.record(format!("branches:{}/{}", owner, repo))?;
        Ok(Self::repo_list(&self.branches, owner, repo))
    }

    async fn pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>> {
        self.record(format!("pulls:{}/{}", owner, repo))?;
        Ok(Self::repo_list(&self.pulls, owner, repo))
    }

    async fn issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>> {
        self.record(format!("issues:{}/{}", owner, repo))?;
        Ok(Self::repo_list(&self.issues, owner, repo))
    }

    async fn notifications(&self, query: &NotificationQuery) -> Result<Vec<Notification>> {
        self.record("notifications".to_string())?;
        Ok(self
            .notifications
            .iter()
            .filter(|n| query.all || n.unread)
            .cloned()
            .collect())
    }

    async fn unread_notification_count(&self) -> Result<u64> {
        self.record("notifications_count".to_string())?;
        Ok(self.notifications.iter().filter(|n| n.unread).count() as u64)
    }

    async fn mark_thread_read(&self, thread_id: &str) -> Result<()> {
        self.record(format!("mark_read:{}", thread_id))
    }

    async fn mark_all_notifications_read(&self) -> Result<()> {
        self.record("mark_all_read".to_string())
    }

    async fn rate_limit(&self) -> Result<RateLimit> {
        self.record("rate_limit".to_string())?;
        Ok(self.rate_limit.clone())
    }
}

/// Connector handing out clones of one fake and counting connections.
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub fake: FakeGitHub,
    connects: Arc<AtomicUsize>,
    tokens: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl FakeConnector {
    pub fn new(fake: FakeGitHub) -> Self {
        Self {
            fake,
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Token and API base of every connection, in order.
    pub fn connections(&self) -> Vec<(String, Option<String>)> {
        self.tokens.lock().unwrap().clone()
    }
}

impl Connector for FakeConnector {
    type Client = FakeGitHub;

    fn connect(&self, token: &str, api_url: Option<&str>) -> Result<FakeGitHub> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .unwrap()
            .push((token.to_string(), api_url.map(str::to_string)));
        Ok(self.fake.clone())
    }
}

pub fn owner(login: &str) -> Owner {
    Owner {
        id: 1,
        login: login.to_string(),
        owner_type: OwnerType::Organization,
        avatar_url: None,
    }
}

pub fn repo(owner_login: &str, name: &str) -> Repository {
    Repository {
        id: 1000,
        name: name.to_string(),
        full_name: format!("{}/{}", owner_login, name),
        owner: owner(owner_login),
        private: false,
        html_url: format!("https://github.com/{}/{}", owner_login, name),
        description: Some(format!("{} repository", name)),
        language: Some("Rust".to_string()),
        stargazers_count: 5,
        updated_at: None,
    }
}

pub fn workflow(id: u64) -> Workflow {
    Workflow {
        id,
        name: format!("Workflow {}", id),
        path: format!(".github/workflows/w{}.yml", id),
        state: WorkflowState::Active,
        html_url: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn run(id: u64) -> WorkflowRun {
    WorkflowRun {
        id,
        name: Some("CI".to_string()),
        run_number: id,
        status: Some(RunStatus::Completed),
        conclusion: Some(RunConclusion::Success),
        head_branch: Some("main".to_string()),
        created_at: None,
        updated_at: None,
        html_url: Some(format!("https://github.com/acme/a/actions/runs/{}", id)),
    }
}

pub fn runner(id: u64) -> Runner {
    Runner {
        id,
        name: format!("runner-{}", id),
        os: "Linux".to_string(),
        status: RunnerStatus::Online,
        busy: false,
    }
}

pub fn branch(name: &str) -> Branch {
    Branch {
        name: name.to_string(),
        protected: name == "main",
    }
}

pub fn pull(id: u64) -> PullRequest {
    PullRequest {
        id,
        number: id,
        title: format!("Change {}", id),
        state: "open".to_string(),
        html_url: None,
        draft: false,
        created_at: None,
        updated_at: None,
    }
}

pub fn issue(id: u64, is_pull_request: bool) -> Issue {
    Issue {
        id,
        number: id,
        title: format!("Issue {}", id),
        state: "open".to_string(),
        html_url: None,
        created_at: None,
        updated_at: None,
        pull_request: is_pull_request.then(|| serde_json::json!({ "url": "https://api.github.com" })),
    }
}
