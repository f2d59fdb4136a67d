// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Deskhand office bot.
//!
//! YAML parsing with `deny_unknown_fields`, an XDG file hierarchy, `DESKHAND_*`
//! environment overrides, miette diagnostics with typo suggestions, and the
//! [`UserDirectory`] that maps people across chat, tracker, and source host.
//!
//! ```no_run
//! use deskhand_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.http.host, config.http.port);
//! ```

pub mod diagnostic;
pub mod directory;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use directory::{Team, User, UserDirectory, UserTag};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::DeskhandConfig;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<DeskhandConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_sources(&loader::default_config_paths()),
        )),
    }
}

/// Load configuration from a YAML string and validate it.
pub fn load_and_validate_str(yaml_content: &str) -> Result<DeskhandConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(yaml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), yaml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from an explicit file (`--config`) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<DeskhandConfig, Vec<ConfigError>> {
    if !path.exists() {
        return Err(vec![ConfigError::Other(format!(
            "config file {} does not exist",
            path.display()
        ))]);
    }
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_sources(&[path.to_path_buf()]),
        )),
    }
}

/// Reads whichever of `paths` exist, for error span resolution.
fn collect_sources(paths: &[std::path::PathBuf]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(path).ok()?;
            let shown = if path.is_relative() {
                std::env::current_dir()
                    .map(|d| d.join(path).display().to_string())
                    .unwrap_or_else(|_| path.display().to_string())
            } else {
                path.display().to_string()
            };
            Some((shown, content))
        })
        .collect()
}
