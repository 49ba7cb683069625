// Command-line interface.
// Parses arguments and runs the config subcommands against the store.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use repotree::config::{ConfigStore, mask_token};
use repotree::error::Result;

/// Local GitHub repository explorer API
#[derive(Debug, Parser)]
#[command(name = "repotree", version)]
#[command(about = "Serve GitHub organizations, repositories, and Actions data as a lazily-loaded tree")]
pub struct Cli {
    /// Configuration file path (defaults to the platform config directory)
    #[arg(long, global = true, env = "REPOTREE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, env = "REPOTREE_HOST", default_value = "127.0.0.1")]
        host: IpAddr,
        /// Port to bind
        #[arg(long, env = "REPOTREE_PORT", default_value_t = 8000)]
        port: u16,
        /// Origin allowed by CORS; repeat for several
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
        /// Token used when neither the request nor the config has one
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },
    /// Inspect or edit the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the configuration with the token masked
    Show,
    /// Print the configuration file path
    Path,
    /// Store a GitHub token
    SetToken { token: String },
    /// Remove the stored GitHub token
    ClearToken,
    /// Set the GitHub API base URL
    SetApiUrl { url: String },
    /// Set the default organization; omit to clear
    SetOrg { organization: Option<String> },
    /// Watch a repository
    AddRepo {
        owner: String,
        repo: String,
        /// Disable notifications for this repository
        #[arg(long)]
        mute: bool,
    },
    /// Stop watching a repository
    RemoveRepo { owner: String, repo: String },
    /// List watched repositories
    ListRepos,
    /// Set the UI theme (light or dark)
    SetTheme { theme: String },
    /// Restore defaults
    Reset,
    /// Write the configuration to a file
    Export { file: PathBuf },
    /// Replace the configuration with a file's contents
    Import { file: PathBuf },
}

/// Open the store at `path`, or at the default location.
pub fn open_store(path: Option<&PathBuf>) -> Result<ConfigStore> {
    match path {
        Some(path) => ConfigStore::open(path),
        None => ConfigStore::open_default(),
    }
}

/// Run a config subcommand, returning what to print.
pub fn run_config(store: &mut ConfigStore, command: ConfigCommand) -> Result<String> {
    let output = match command {
        ConfigCommand::Show => serde_json::to_string_pretty(&store.config().redacted())?,
        ConfigCommand::Path => store.path().display().to_string(),
        ConfigCommand::SetToken { token } => {
            let masked = mask_token(&token);
            store.set_token(Some(token))?;
            format!("Token saved ({})", masked)
        }
        ConfigCommand::ClearToken => {
            store.set_token(None)?;
            "Token cleared".to_string()
        }
        ConfigCommand::SetApiUrl { url } => {
            store.set_api_url(&url)?;
            format!("API URL set to {}", store.config().github.api_url)
        }
        ConfigCommand::SetOrg { organization } => {
            store.set_organization(organization)?;
            match &store.config().github.organization {
                Some(org) => format!("Default organization set to {}", org),
                None => "Default organization cleared".to_string(),
            }
        }
        ConfigCommand::AddRepo { owner, repo, mute } => {
            store.add_watched_repo(&owner, &repo, !mute)?;
            format!("Watching {}/{}", owner, repo)
        }
        ConfigCommand::RemoveRepo { owner, repo } => {
            if store.remove_watched_repo(&owner, &repo)? {
                format!("Stopped watching {}/{}", owner, repo)
            } else {
                format!("{}/{} was not watched", owner, repo)
            }
        }
        ConfigCommand::ListRepos => store
            .watched_repos()
            .iter()
            .map(|w| {
                let bell = if w.notifications { "" } else { " (muted)" };
                format!("{}/{}{}", w.owner, w.repo, bell)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        ConfigCommand::SetTheme { theme } => {
            store.set_theme(&theme)?;
            format!("Theme set to {}", theme)
        }
        ConfigCommand::Reset => {
            store.reset()?;
            "Configuration reset to defaults".to_string()
        }
        ConfigCommand::Export { file } => {
            store.export(&file)?;
            format!("Exported to {}", file.display())
        }
        ConfigCommand::Import { file } => {
            store.import(&file)?;
            format!("Imported from {}", file.display())
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tempfile::TempDir;

    fn store() -> (TempDir, ConfigStore) {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::open(dir.path().join("config.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["repotree", "serve"]).unwrap();
        match cli.command {
            Command::Serve { host, port, .. } => {
                assert_eq!(
                    SocketAddr::new(host, port).to_string(),
                    "127.0.0.1:8000"
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_serve_overrides_and_origins() {
        let cli = Cli::try_parse_from([
            "repotree",
            "serve",
            "--port",
            "9100",
            "--allow-origin",
            "http://localhost:1420",
            "--allow-origin",
            "tauri://localhost",
            "--config",
            "/tmp/repotree.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/repotree.json")));
        match cli.command {
            Command::Serve {
                port, allow_origins, ..
            } => {
                assert_eq!(port, 9100);
                assert_eq!(allow_origins.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_config_subcommands_parse() {
        let cli = Cli::try_parse_from(["repotree", "config", "add-repo", "acme", "api", "--mute"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                command: ConfigCommand::AddRepo { mute: true, .. }
            }
        ));

        let cli = Cli::try_parse_from(["repotree", "config", "set-org"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                command: ConfigCommand::SetOrg { organization: None }
            }
        ));

        assert!(Cli::try_parse_from(["repotree", "config", "bogus"]).is_err());
    }

    #[test]
    fn test_run_config_commands() {
        let (dir, mut store) = store();

        let out = run_config(
            &mut store,
            ConfigCommand::SetToken {
                token: "ghp_abcdef987654".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out, "Token saved (****7654)");

        let shown = run_config(&mut store, ConfigCommand::Show).unwrap();
        assert!(shown.contains("****7654"));
        assert!(!shown.contains("ghp_abcdef987654"));

        run_config(
            &mut store,
            ConfigCommand::AddRepo {
                owner: "acme".to_string(),
                repo: "api".to_string(),
                mute: true,
            },
        )
        .unwrap();
        let listed = run_config(&mut store, ConfigCommand::ListRepos).unwrap();
        assert_eq!(listed, "acme/api (muted)");

        let out = run_config(
            &mut store,
            ConfigCommand::RemoveRepo {
                owner: "acme".to_string(),
                repo: "web".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out, "acme/web was not watched");

        assert!(
            run_config(
                &mut store,
                ConfigCommand::SetTheme {
                    theme: "sepia".to_string()
                }
            )
            .is_err()
        );

        let backup = dir.path().join("backup.json");
        run_config(&mut store, ConfigCommand::Export { file: backup.clone() }).unwrap();
        run_config(&mut store, ConfigCommand::Reset).unwrap();
        assert!(store.config().github.token.is_none());
        run_config(&mut store, ConfigCommand::Import { file: backup }).unwrap();
        assert_eq!(
            store.config().github.token.as_deref(),
            Some("ghp_abcdef987654")
        );
    }
}
