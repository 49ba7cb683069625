// Shallow tree assembly.
// Builds organization nodes holding lazy repository nodes, one root per login.

use serde_json::json;
use tracing::debug;

use crate::error::Result;
use crate::github::{GitHubApi, REPOS_PER_PAGE, Repository, collect_pages};

use super::ids;
use super::node::{NodeType, TreeNode};

/// Label of the synthetic root grouping the identity's own repositories.
pub const PERSONAL_ROOT: &str = "Personal Repositories";

/// Split a comma-separated login filter, keeping order and duplicates.
pub fn parse_org_filter(filter: &str) -> Vec<String> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|login| !login.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the organization → repository level of the tree.
///
/// Roots come from `org_filter` when it names at least one login, else from
/// `default_org`, else from the identity's organizations preceded by its own
/// repositories. Any upstream error aborts the whole build.
pub async fn build_shallow_tree<A>(
    api: &A,
    org_filter: Option<&str>,
    default_org: Option<&str>,
) -> Result<Vec<TreeNode>>
where
    A: GitHubApi + ?Sized,
{
    let filter = org_filter
        .map(parse_org_filter)
        .filter(|logins| !logins.is_empty());
    let default_org = default_org.map(str::trim).filter(|org| !org.is_empty());

    let mut roots = Vec::new();

    let logins = match (filter, default_org) {
        (Some(logins), _) => logins,
        (None, Some(org)) => vec![org.to_string()],
        (None, None) => {
            let orgs = api.user_orgs().await?;
            let personal =
                collect_pages(REPOS_PER_PAGE, |page| api.own_repos_page(page, REPOS_PER_PAGE))
                    .await?;
            if !personal.is_empty() {
                roots.push(organization_node(PERSONAL_ROOT, &personal));
            }
            orgs.into_iter().map(|org| org.login).collect()
        }
    };

    for login in &logins {
        let repos = login_repos(api, login).await?;
        roots.push(organization_node(login, &repos));
    }

    debug!(roots = roots.len(), "built shallow tree");
    Ok(roots)
}

/// All repositories of `login`, falling back to the user endpoint when the
/// login is not an organization.
pub async fn login_repos<A>(api: &A, login: &str) -> Result<Vec<Repository>>
where
    A: GitHubApi + ?Sized,
{
    let org_result = collect_pages(REPOS_PER_PAGE, |page| {
        api.org_repos_page(login, page, REPOS_PER_PAGE)
    })
    .await;

    match org_result {
        Err(e) if e.is_not_found() => {
            debug!(login, "not an organization, listing user repositories");
            collect_pages(REPOS_PER_PAGE, |page| {
                api.user_repos_page(login, page, REPOS_PER_PAGE)
            })
            .await
        }
        other => other,
    }
}

/// One root node with a lazy child per repository, in upstream order.
pub fn organization_node(login: &str, repos: &[Repository]) -> TreeNode {
    let children = repos.iter().map(repository_node).collect();
    TreeNode::loaded(
        ids::organization(login),
        login,
        NodeType::Organization,
        children,
    )
    .with_meta("repo_count", json!(repos.len()))
}

pub fn repository_node(repo: &Repository) -> TreeNode {
    let owner = &repo.owner.login;
    TreeNode::lazy(
        ids::repository(owner, &repo.name),
        repo.name.as_str(),
        NodeType::Repository,
    )
    .with_url(Some(repo.html_url.as_str()))
    .with_meta("description", json!(repo.description))
    .with_meta("private", json!(repo.private))
    .with_meta("language", json!(repo.language))
    .with_meta("stars", json!(repo.stargazers_count))
    .with_meta("updated_at", json!(repo.updated_at))
    .with_meta("owner", json!(owner))
}
