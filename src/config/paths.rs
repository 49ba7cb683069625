// Config path utilities.
// Locates the configuration file in the platform config directory.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Base config directory (~/.config/repotree on Linux).
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "repotree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path to the configuration file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.json"))
}
