// repotree library.
// GitHub tree builder, config store, and the local HTTP API that serves them.

pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod server;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{AppConfig, ConfigStore};
pub use error::{RepoTreeError, Result};
pub use github::{Connector, GitHubApi, GitHubClient, HttpConnector};
pub use server::{AppState, router, serve};
pub use tree::{Credentials, TreeBuilder, TreeNode};
