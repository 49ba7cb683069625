// GitHub API response types.
// Defines structs for deserializing GitHub REST API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner type discriminator (user or organization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OwnerType {
    User,
    #[default]
    Organization,
    Bot,
    #[serde(other)]
    Unknown,
}

/// GitHub user or organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: u64,
    pub login: String,
    #[serde(rename = "type", default)]
    pub owner_type: OwnerType,
    pub avatar_url: Option<String>,
}

/// GitHub repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    #[serde(default)]
    pub private: bool,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// GitHub Actions workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub state: WorkflowState,
    pub html_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Active,
    Deleted,
    DisabledFork,
    DisabledInactivity,
    DisabledManually,
    #[serde(other)]
    Unknown,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Active => "active",
            WorkflowState::Deleted => "deleted",
            WorkflowState::DisabledFork => "disabled_fork",
            WorkflowState::DisabledInactivity => "disabled_inactivity",
            WorkflowState::DisabledManually => "disabled_manually",
            WorkflowState::Unknown => "unknown",
        }
    }
}

/// GitHub Actions workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub name: Option<String>,
    pub run_number: u64,
    pub status: Option<RunStatus>,
    pub conclusion: Option<RunConclusion>,
    pub head_branch: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub html_url: Option<String>,
}

impl WorkflowRun {
    /// Conclusion for finished runs, otherwise the live status.
    pub fn display_status(&self) -> Option<&'static str> {
        self.conclusion
            .map(|c| c.as_str())
            .or_else(|| self.status.map(|s| s.as_str()))
    }
}

/// Workflow run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Waiting => "waiting",
            RunStatus::Requested => "requested",
            RunStatus::Pending => "pending",
            RunStatus::Unknown => "unknown",
        }
    }
}

/// Workflow run conclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    Neutral,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

impl RunConclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunConclusion::Success => "success",
            RunConclusion::Failure => "failure",
            RunConclusion::Cancelled => "cancelled",
            RunConclusion::Skipped => "skipped",
            RunConclusion::TimedOut => "timed_out",
            RunConclusion::ActionRequired => "action_required",
            RunConclusion::Neutral => "neutral",
            RunConclusion::Stale => "stale",
            RunConclusion::StartupFailure => "startup_failure",
            RunConclusion::Unknown => "unknown",
        }
    }
}

/// Self-hosted runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    pub id: u64,
    pub name: String,
    pub os: String,
    pub status: RunnerStatus,
    pub busy: bool,
}

/// Runner status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerStatus {
    Online,
    Offline,
    #[serde(other)]
    Unknown,
}

impl RunnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerStatus::Online => "online",
            RunnerStatus::Offline => "offline",
            RunnerStatus::Unknown => "unknown",
        }
    }
}

/// Repository branch. Branches carry no numeric id upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}

/// Pull request as listed by `/repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: Option<String>,
    #[serde(default)]
    pub draft: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Issue as listed by `/repos/{owner}/{repo}/issues`.
///
/// That endpoint also returns pull requests; those carry a `pull_request` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Notification thread for the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub unread: bool,
    pub reason: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_read_at: Option<DateTime<Utc>>,
    pub subject: NotificationSubject,
    pub repository: NotificationRepository,
    pub url: Option<String>,
}

/// What a notification thread is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSubject {
    pub title: String,
    pub url: Option<String>,
    pub latest_comment_url: Option<String>,
    #[serde(rename = "type")]
    pub subject_type: String,
}

/// Repository a notification thread belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRepository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: Option<String>,
    #[serde(default)]
    pub private: bool,
}

/// Query filters for listing notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationQuery {
    /// Include notifications already marked as read.
    #[serde(default)]
    pub all: bool,
    /// Only threads the user directly participates in.
    #[serde(default)]
    pub participating: bool,
    pub since: Option<String>,
    pub before: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_notifications_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_notifications_per_page() -> u32 {
    50
}

impl Default for NotificationQuery {
    fn default() -> Self {
        Self {
            all: false,
            participating: false,
            since: None,
            before: None,
            page: default_page(),
            per_page: default_notifications_per_page(),
        }
    }
}

/// Rate limit bucket as reported by `/rate_limit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
    #[serde(default)]
    pub used: u64,
}
