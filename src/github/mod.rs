// GitHub API module.
// Provides the client, the upstream trait seam, and response types.

pub mod api;
pub mod client;
pub mod endpoints;
pub mod types;

pub use api::{Connector, GitHubApi, HttpConnector, REPOS_PER_PAGE, collect_pages};
pub use client::GitHubClient;
pub use types::*;
