// Repository detail expansion.
// Fetches the six sub-categories of one repository concurrently and builds container nodes.

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::Result;
use crate::github::{Branch, GitHubApi, Issue, PullRequest, Runner, Workflow, WorkflowRun};

use super::ids;
use super::node::{NodeType, TreeNode};

/// Detail categories, in the order their containers are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Workflows,
    WorkflowRuns,
    Runners,
    Branches,
    PullRequests,
    Issues,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Workflows,
        Category::WorkflowRuns,
        Category::Runners,
        Category::Branches,
        Category::PullRequests,
        Category::Issues,
    ];

    /// Container label; the item count is appended in parentheses.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Workflows => "Workflows",
            Category::WorkflowRuns => "Recent Runs",
            Category::Runners => "Runners",
            Category::Branches => "Branches",
            Category::PullRequests => "Pull Requests",
            Category::Issues => "Issues",
        }
    }

    /// Maximum number of leaves under the container. Runners are not capped.
    pub fn cap(&self) -> Option<usize> {
        match self {
            Category::WorkflowRuns => Some(10),
            Category::Runners => None,
            Category::Workflows
            | Category::Branches
            | Category::PullRequests
            | Category::Issues => Some(20),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Category::Workflows => NodeType::Workflows,
            Category::WorkflowRuns => NodeType::WorkflowRuns,
            Category::Runners => NodeType::Runners,
            Category::Branches => NodeType::Branches,
            Category::PullRequests => NodeType::PullRequests,
            Category::Issues => NodeType::Issues,
        }
    }

    pub fn container_id(&self, owner: &str, repo: &str) -> String {
        match self {
            Category::Workflows => ids::workflows(owner, repo),
            Category::WorkflowRuns => ids::workflow_runs(owner, repo),
            Category::Runners => ids::runners(owner, repo),
            Category::Branches => ids::branches(owner, repo),
            Category::PullRequests => ids::pull_requests(owner, repo),
            Category::Issues => ids::issues(owner, repo),
        }
    }
}

/// Number of runs requested upstream.
const RECENT_RUNS: u32 = 10;

/// Outcome of one category fetch.
///
/// `Degraded` stands in for an upstream failure that was swallowed so the
/// other categories can still render.
#[derive(Debug, Clone)]
pub enum Fetched<T> {
    Items(Vec<T>),
    Degraded(String),
}

impl<T> Fetched<T> {
    fn from_result(category: Category, result: Result<Vec<T>>) -> Self {
        match result {
            Ok(items) => Fetched::Items(items),
            Err(e) => {
                warn!(?category, error = %e, "category fetch failed, treating as empty");
                Fetched::Degraded(e.to_string())
            }
        }
    }

    /// The fetched items; empty when degraded.
    pub fn items(&self) -> &[T] {
        match self {
            Fetched::Items(items) => items,
            Fetched::Degraded(_) => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Fetched::Degraded(_))
    }
}

/// Result of expanding one repository.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryDetail {
    /// Non-empty category containers in fixed category order.
    pub containers: Vec<TreeNode>,
    /// Categories whose fetch failed and were treated as empty.
    pub degraded: Vec<Category>,
}

/// Expand one repository. Never fails: each category degrades on its own.
pub async fn build_repository_detail<A>(api: &A, owner: &str, repo: &str) -> RepositoryDetail
where
    A: GitHubApi + ?Sized,
{
    let (workflows, runs, runners, branches, pulls, issues) = tokio::join!(
        api.workflows(owner, repo),
        api.recent_runs(owner, repo, RECENT_RUNS),
        api.runners(owner, repo),
        api.branches(owner, repo),
        api.pull_requests(owner, repo),
        api.issues(owner, repo),
    );

    let workflows = Fetched::from_result(Category::Workflows, workflows);
    let runs = Fetched::from_result(Category::WorkflowRuns, runs);
    let runners = Fetched::from_result(Category::Runners, runners);
    let branches = Fetched::from_result(Category::Branches, branches);
    let pulls = Fetched::from_result(Category::PullRequests, pulls);
    let issues = Fetched::from_result(Category::Issues, issues.map(without_pull_requests));

    let degraded = [
        (Category::Workflows, workflows.is_degraded()),
        (Category::WorkflowRuns, runs.is_degraded()),
        (Category::Runners, runners.is_degraded()),
        (Category::Branches, branches.is_degraded()),
        (Category::PullRequests, pulls.is_degraded()),
        (Category::Issues, issues.is_degraded()),
    ]
    .into_iter()
    .filter_map(|(category, failed)| failed.then_some(category))
    .collect();

    let containers = [
        container(Category::Workflows, owner, repo, workflows.items(), workflow_node),
        container(Category::WorkflowRuns, owner, repo, runs.items(), run_node),
        container(Category::Runners, owner, repo, runners.items(), runner_node),
        container(Category::Branches, owner, repo, branches.items(), |b| {
            branch_node(owner, repo, b)
        }),
        container(Category::PullRequests, owner, repo, pulls.items(), pull_request_node),
        container(Category::Issues, owner, repo, issues.items(), issue_node),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    debug!(owner, repo, containers = containers.len(), "built repository detail");
    RepositoryDetail {
        containers,
        degraded,
    }
}

/// The issues endpoint also lists pull requests; drop them.
fn without_pull_requests(issues: Vec<Issue>) -> Vec<Issue> {
    issues
        .into_iter()
        .filter(|issue| !issue.is_pull_request())
        .collect()
}

/// Container for a non-empty category, truncated to the category cap.
fn container<T>(
    category: Category,
    owner: &str,
    repo: &str,
    items: &[T],
    leaf: impl Fn(&T) -> TreeNode,
) -> Option<TreeNode> {
    if items.is_empty() {
        return None;
    }

    let children = items
        .iter()
        .take(category.cap().unwrap_or(usize::MAX))
        .map(leaf)
        .collect();

    Some(TreeNode::loaded(
        category.container_id(owner, repo),
        format!("{} ({})", category.label(), items.len()),
        category.node_type(),
        children,
    ))
}

fn workflow_node(workflow: &Workflow) -> TreeNode {
    TreeNode::leaf(
        ids::workflow(workflow.id),
        workflow.name.as_str(),
        NodeType::Workflow,
    )
    .with_status(Some(workflow.state.as_str()))
    .with_url(workflow.html_url.as_deref())
    .with_meta("path", json!(workflow.path))
    .with_meta("created_at", json!(workflow.created_at))
    .with_meta("updated_at", json!(workflow.updated_at))
}

fn run_node(run: &WorkflowRun) -> TreeNode {
    let name = run.name.as_deref().unwrap_or("Workflow run");
    TreeNode::leaf(
        ids::workflow_run(run.id),
        format!("{} #{}", name, run.run_number),
        NodeType::WorkflowRun,
    )
    .with_status(run.display_status())
    .with_url(run.html_url.as_deref())
    .with_meta("run_number", json!(run.run_number))
    .with_meta("head_branch", json!(run.head_branch))
    .with_meta("created_at", json!(run.created_at))
    .with_meta("updated_at", json!(run.updated_at))
}

fn runner_node(runner: &Runner) -> TreeNode {
    TreeNode::leaf(ids::runner(runner.id), runner.name.as_str(), NodeType::Runner)
        .with_status(Some(runner.status.as_str()))
        .with_meta("os", json!(runner.os))
        .with_meta("busy", json!(runner.busy))
}

fn branch_node(owner: &str, repo: &str, branch: &Branch) -> TreeNode {
    TreeNode::leaf(
        ids::branch(owner, repo, &branch.name),
        branch.name.as_str(),
        NodeType::Branch,
    )
    .with_meta("protected", json!(branch.protected))
}

fn pull_request_node(pr: &PullRequest) -> TreeNode {
    TreeNode::leaf(
        ids::pull_request(pr.id),
        format!("#{} {}", pr.number, pr.title),
        NodeType::PullRequest,
    )
    .with_status(Some(pr.state.as_str()))
    .with_url(pr.html_url.as_deref())
    .with_meta("number", json!(pr.number))
    .with_meta("draft", json!(pr.draft))
    .with_meta("created_at", json!(pr.created_at))
    .with_meta("updated_at", json!(pr.updated_at))
}

fn issue_node(issue: &Issue) -> TreeNode {
    TreeNode::leaf(
        ids::issue(issue.id),
        format!("#{} {}", issue.number, issue.title),
        NodeType::Issue,
    )
    .with_status(Some(issue.state.as_str()))
    .with_url(issue.html_url.as_deref())
    .with_meta("number", json!(issue.number))
    .with_meta("created_at", json!(issue.created_at))
    .with_meta("updated_at", json!(issue.updated_at))
}
