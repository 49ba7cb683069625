// Configuration store.
// Loads the config record once and rewrites the whole file after every mutation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{RepoTreeError, Result};

use super::model::{AppConfig, EnabledRepo, THEMES, WatchedRepo, WindowPosition, WindowSize};
use super::paths;

/// File-backed configuration.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: AppConfig,
}

impl ConfigStore {
    /// Open the store at the platform default location.
    pub fn open_default() -> Result<Self> {
        let path = paths::config_path().ok_or_else(|| {
            RepoTreeError::Config("could not determine the platform config directory".to_string())
        })?;
        Self::open(path)
    }

    /// Open the store at `path`.
    ///
    /// A missing file is created with defaults. An unreadable file is logged and
    /// replaced by defaults in memory, leaving the file untouched until the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            let store = Self {
                path,
                config: AppConfig::default(),
            };
            store.save()?;
            return Ok(store);
        }

        let config = match read_config(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                AppConfig::default()
            }
        };

        Ok(Self { path, config })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Write the whole record to disk.
    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.config)?;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Apply `mutate` to a copy and keep it only once it is on disk.
    fn update(&mut self, mutate: impl FnOnce(&mut AppConfig)) -> Result<()> {
        let mut next = self.config.clone();
        mutate(&mut next);
        write_json(&self.path, &next)?;
        self.config = next;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Store or clear the GitHub token.
    pub fn set_token(&mut self, token: Option<String>) -> Result<()> {
        let token = token.filter(|t| !t.trim().is_empty());
        self.update(|config| config.github.token = token)
    }

    pub fn set_api_url(&mut self, api_url: &str) -> Result<()> {
        let api_url = api_url.trim();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(RepoTreeError::InvalidRequest(format!(
                "API URL must start with http:// or https://: {}",
                api_url
            )));
        }
        let api_url = api_url.trim_end_matches('/').to_string();
        self.update(|config| config.github.api_url = api_url)
    }

    /// Set or clear the default organization.
    pub fn set_organization(&mut self, organization: Option<String>) -> Result<()> {
        let organization = organization
            .map(|org| org.trim().to_string())
            .filter(|org| !org.is_empty());
        self.update(|config| config.github.organization = organization)
    }

    /// Add a watched repository, or update its notification flag if already present.
    pub fn add_watched_repo(&mut self, owner: &str, repo: &str, notifications: bool) -> Result<()> {
        self.update(|config| {
            match config
                .watched_repos
                .iter_mut()
                .find(|w| w.owner == owner && w.repo == repo)
            {
                Some(watched) => watched.notifications = notifications,
                None => config.watched_repos.push(WatchedRepo {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    notifications,
                    last_checked: None,
                }),
            }
        })
    }

    /// Remove a watched repository. Returns whether it was present.
    pub fn remove_watched_repo(&mut self, owner: &str, repo: &str) -> Result<bool> {
        let before = self.config.watched_repos.len();
        self.update(|config| {
            config
                .watched_repos
                .retain(|w| !(w.owner == owner && w.repo == repo))
        })?;
        Ok(self.config.watched_repos.len() != before)
    }

    pub fn watched_repos(&self) -> &[WatchedRepo] {
        &self.config.watched_repos
    }

    /// Replace the enabled/disabled state of tree nodes.
    pub fn set_enabled_repos(&mut self, enabled: Vec<EnabledRepo>) -> Result<()> {
        self.update(|config| config.enabled_repos = enabled)
    }

    pub fn enabled_repos(&self) -> &[EnabledRepo] {
        &self.config.enabled_repos
    }

    pub fn set_theme(&mut self, theme: &str) -> Result<()> {
        if !THEMES.contains(&theme) {
            return Err(RepoTreeError::InvalidRequest(format!(
                "unknown theme {:?}, expected one of {:?}",
                theme, THEMES
            )));
        }
        let theme = theme.to_string();
        self.update(|config| config.ui.theme = theme)
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        let language = language.to_string();
        self.update(|config| config.ui.language = language)
    }

    /// Update window geometry; `None` leaves the stored value unchanged.
    pub fn set_window(
        &mut self,
        size: Option<WindowSize>,
        position: Option<WindowPosition>,
    ) -> Result<()> {
        self.update(|config| {
            if size.is_some() {
                config.ui.window_size = size;
            }
            if position.is_some() {
                config.ui.window_position = position;
            }
        })
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) -> Result<()> {
        self.update(|config| *config = AppConfig::default())
    }

    /// Write a copy of the configuration to `path`.
    pub fn export(&self, path: &Path) -> Result<()> {
        write_json(path, &self.config)
    }

    /// Replace the configuration with the contents of `path` and persist it.
    pub fn import(&mut self, path: &Path) -> Result<()> {
        let imported = read_config(path)?;
        self.update(|config| *config = imported)
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&contents)?;
    Ok(config)
}

/// Write pretty JSON atomically via a temp file.
fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(data)?;

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, ConfigStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::open(temp_dir.path().join("nested").join("config.json")).unwrap();
        (temp_dir, store)
    }

    fn reload(store: &ConfigStore) -> AppConfig {
        ConfigStore::open(store.path()).unwrap().config().clone()
    }

    #[test]
    fn test_missing_file_created_with_defaults() {
        let (_dir, store) = open_temp();
        assert!(store.path().exists());
        assert_eq!(store.config(), &AppConfig::default());
        assert_eq!(reload(&store), AppConfig::default());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let store = ConfigStore::open(&path).unwrap();
        assert_eq!(store.config(), &AppConfig::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_github_settings_persist() {
        let (_dir, mut store) = open_temp();
        store.set_token(Some("ghp_testtoken123456789".to_string())).unwrap();
        store
            .set_api_url("https://github.enterprise.com/api/v3/")
            .unwrap();
        store
            .set_organization(Some(" test-organization ".to_string()))
            .unwrap();

        let config = reload(&store);
        assert_eq!(config.github.token.as_deref(), Some("ghp_testtoken123456789"));
        assert_eq!(config.github.api_url, "https://github.enterprise.com/api/v3");
        assert_eq!(config.github.organization.as_deref(), Some("test-organization"));

        store.set_token(None).unwrap();
        store.set_organization(Some(String::new())).unwrap();
        let config = reload(&store);
        assert!(config.github.token.is_none());
        assert!(config.github.organization.is_none());
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let (_dir, mut store) = open_temp();
        let err = store.set_api_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, RepoTreeError::InvalidRequest(_)));
        assert_eq!(store.config().github.api_url, "https://api.github.com");
    }

    #[test]
    fn test_watched_repos_add_update_remove() {
        let (_dir, mut store) = open_temp();
        store.add_watched_repo("microsoft", "vscode", true).unwrap();
        store.add_watched_repo("facebook", "react", false).unwrap();
        store.add_watched_repo("python", "cpython", true).unwrap();
        assert_eq!(store.watched_repos().len(), 3);

        store.add_watched_repo("facebook", "react", true).unwrap();
        assert_eq!(store.watched_repos().len(), 3);
        assert!(store.watched_repos()[1].notifications);

        assert!(store.remove_watched_repo("facebook", "react").unwrap());
        assert!(!store.remove_watched_repo("facebook", "react").unwrap());

        let config = reload(&store);
        let names: Vec<_> = config.watched_repos.iter().map(|w| w.repo.as_str()).collect();
        assert_eq!(names, vec!["vscode", "cpython"]);
    }

    #[test]
    fn test_enabled_repos_replaced_wholesale() {
        let (_dir, mut store) = open_temp();
        store
            .set_enabled_repos(vec![
                EnabledRepo {
                    node_id: "org-acme".to_string(),
                    enabled: true,
                },
                EnabledRepo {
                    node_id: "repo-acme-a".to_string(),
                    enabled: false,
                },
            ])
            .unwrap();
        store
            .set_enabled_repos(vec![EnabledRepo {
                node_id: "repo-acme-b".to_string(),
                enabled: false,
            }])
            .unwrap();

        let config = reload(&store);
        assert_eq!(config.enabled_repos.len(), 1);
        assert_eq!(config.enabled_repos[0].node_id, "repo-acme-b");
    }

    #[test]
    fn test_ui_settings() {
        let (_dir, mut store) = open_temp();
        store.set_theme("dark").unwrap();
        assert!(store.set_theme("solarized").is_err());
        store
            .set_window(Some(WindowSize { width: 1280, height: 800 }), None)
            .unwrap();
        store
            .set_window(None, Some(WindowPosition { x: 10, y: -20 }))
            .unwrap();

        let config = reload(&store);
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(
            config.ui.window_size,
            Some(WindowSize { width: 1280, height: 800 })
        );
        assert_eq!(config.ui.window_position, Some(WindowPosition { x: 10, y: -20 }));
    }

    #[test]
    fn test_export_import_reset() {
        let (dir, mut store) = open_temp();
        store.set_organization(Some("acme".to_string())).unwrap();
        let export_path = dir.path().join("backup.json");
        store.export(&export_path).unwrap();

        store.reset().unwrap();
        assert_eq!(reload(&store), AppConfig::default());

        store.import(&export_path).unwrap();
        assert_eq!(
            reload(&store).github.organization.as_deref(),
            Some("acme")
        );
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let (dir, mut store) = open_temp();
        store.set_theme("dark").unwrap();

        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        store.path = blocker.join("config.json");

        assert!(store.set_theme("light").is_err());
        assert!(store.add_watched_repo("acme", "a", true).is_err());
        assert_eq!(store.config().ui.theme, "dark");
        assert!(store.watched_repos().is_empty());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let (_dir, store) = open_temp();
        store.save().unwrap();
        assert!(!store.path().with_extension("tmp").exists());
    }
}
