// Configuration record.
// One serde document with defaults for every field.

use serde::{Deserialize, Serialize};

use crate::github::client::GITHUB_API_BASE;

/// GitHub access settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub token: Option<String>,
    /// API base; differs from the public one on GitHub Enterprise.
    pub api_url: String,
    /// Organization shown when no explicit filter is requested.
    pub organization: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: GITHUB_API_BASE.to_string(),
            organization: None,
        }
    }
}

/// A repository the user follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedRepo {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default)]
    pub last_checked: Option<String>,
}

/// Visibility toggle for a tree node, keyed by its node id (e.g. `repo-acme-a`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledRepo {
    pub node_id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

/// UI preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
    pub language: String,
    pub window_size: Option<WindowSize>,
    pub window_position: Option<WindowPosition>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            language: "en".to_string(),
            window_size: None,
            window_position: None,
        }
    }
}

/// Themes the GUI knows how to render.
pub const THEMES: [&str; 2] = ["light", "dark"];

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub watched_repos: Vec<WatchedRepo>,
    pub enabled_repos: Vec<EnabledRepo>,
    pub ui: UiConfig,
    /// Seconds between tree refreshes.
    pub auto_refresh_interval: u64,
    /// Seconds between background notification polls.
    pub notifications_refresh_interval: u64,
    pub max_repos_per_org: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            watched_repos: Vec::new(),
            enabled_repos: Vec::new(),
            ui: UiConfig::default(),
            auto_refresh_interval: 300,
            notifications_refresh_interval: 15,
            max_repos_per_org: 100,
        }
    }
}

impl AppConfig {
    /// Copy safe to hand to a client: the token is masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.github.token = self.github.token.as_deref().map(mask_token);
        config
    }
}

fn default_true() -> bool {
    true
}

/// Keep the last four characters of a token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
