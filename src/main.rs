// repotree binary.
// Runs the HTTP API or a config subcommand.

mod cli;

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use repotree::server::{AppState, DEFAULT_ALLOWED_ORIGINS, router, serve};
use repotree::{HttpConnector, logging};

use crate::cli::{Cli, Command, open_store, run_config};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    debug!(command = ?cli.command, "launched");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "repotree failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> repotree::Result<()> {
    let mut store = open_store(cli.config.as_ref())?;

    match cli.command {
        Command::Serve {
            host,
            port,
            allow_origins,
            github_token,
        } => {
            let origins = if allow_origins.is_empty() {
                DEFAULT_ALLOWED_ORIGINS
                    .iter()
                    .map(|origin| origin.to_string())
                    .collect()
            } else {
                allow_origins
            };
            let state = AppState::new(HttpConnector, store, github_token);
            serve(SocketAddr::new(host, port), router(state, &origins)).await
        }
        Command::Config { command } => {
            let output = run_config(&mut store, command)?;
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
    }
}
