// Configuration module.
// User settings persisted as a single JSON record.

pub mod model;
pub mod paths;
pub mod store;

pub use model::{
    AppConfig, EnabledRepo, GitHubConfig, UiConfig, WatchedRepo, WindowPosition, WindowSize,
    mask_token,
};
pub use store::ConfigStore;
