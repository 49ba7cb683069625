// Tree building module.
// Turns paginated GitHub listings into a lazily-expanded tree of nodes.

pub mod detail;
pub mod ids;
pub mod node;
pub mod shallow;

pub use detail::{Category, Fetched, RepositoryDetail, build_repository_detail};
pub use node::{NodeType, TreeNode};
pub use shallow::{PERSONAL_ROOT, build_shallow_tree, parse_org_filter};

use tracing::info;

use crate::error::{RepoTreeError, Result};
use crate::github::Connector;

/// Per-call upstream access: the credential and an optional API base override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: Option<String>,
    pub api_url: Option<String>,
}

impl Credentials {
    pub fn new(token: Option<String>, api_url: Option<String>) -> Self {
        Self { token, api_url }
    }

    /// The token, if one was supplied and is not blank.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Entry point for tree requests.
///
/// Each operation builds a fresh upstream client from the call's credentials
/// and drops it when the operation returns.
#[derive(Debug, Clone)]
pub struct TreeBuilder<C> {
    connector: C,
}

impl<C: Connector> TreeBuilder<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Create the upstream client for one call.
    ///
    /// Fails with `AuthenticationRequired` before any request when no token is present.
    pub fn connect(&self, credentials: &Credentials) -> Result<C::Client> {
        let token = credentials
            .token()
            .ok_or(RepoTreeError::AuthenticationRequired)?;
        self.connector
            .connect(token, credentials.api_url.as_deref())
    }

    /// Organization and repository levels of the tree.
    pub async fn shallow_tree(
        &self,
        credentials: &Credentials,
        org_filter: Option<&str>,
        default_org: Option<&str>,
    ) -> Result<Vec<TreeNode>> {
        let client = self.connect(credentials)?;
        let roots = build_shallow_tree(&client, org_filter, default_org).await?;
        info!(roots = roots.len(), "served repository tree");
        Ok(roots)
    }

    /// Containers to merge into the `owner/repo` repository node.
    pub async fn repository_detail(
        &self,
        credentials: &Credentials,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryDetail> {
        let client = self.connect(credentials)?;
        if owner.trim().is_empty() || repo.trim().is_empty() {
            return Err(RepoTreeError::InvalidRequest(
                "owner and repository name are required".to_string(),
            ));
        }
        let detail = build_repository_detail(&client, owner, repo).await;
        info!(
            owner,
            repo,
            containers = detail.containers.len(),
            degraded = detail.degraded.len(),
            "served repository detail"
        );
        Ok(detail)
    }
}
