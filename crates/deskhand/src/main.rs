// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deskhand - an office bot watching the tracker, source host, and chat.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deskhand_config::{ConfigError, DeskhandConfig};

/// Deskhand - an office bot watching the tracker, source host, and chat.
#[derive(Parser, Debug)]
#[command(name = "deskhand", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduler, HTTP gateway, and release bot.
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
    /// Load and validate the configuration, then print a summary.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<DeskhandConfig, Vec<ConfigError>> {
    match path {
        Some(path) => deskhand_config::load_and_validate_path(path),
        None => deskhand_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("deskhand: use --help for available commands");
        return;
    };

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            deskhand_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Migrate => check::run_migrate(&config).await,
        Commands::CheckConfig => check::run_check_config(&config),
    };

    if let Err(e) = result {
        eprintln!("deskhand: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["deskhand", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["deskhand", "check-config", "--config", "/tmp/d.yaml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/d.yaml")));

        let cli = Cli::try_parse_from(["deskhand", "--config", "x.yaml", "migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Migrate)));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["deskhand", "shell"]).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let errors = load_config(Some(&path)).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deskhand.yaml");
        std::fs::write(&path, "http:\n  port: 9191\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.http.port, 9191);
    }
}
