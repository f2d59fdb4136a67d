// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/deskhand/deskhand.yaml`, then
//! `~/.config/deskhand/deskhand.yaml`, then `./deskhand.yaml`, with
//! `DESKHAND_*` environment variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};

use crate::model::DeskhandConfig;

/// Top-level sections that `DESKHAND_<SECTION>_<KEY>` variables may target.
const ENV_SECTIONS: &[&str] = &[
    "app",
    "http",
    "storage",
    "slack",
    "jira",
    "bitbucket",
    "hubstaff",
    "telegram",
    "forgotten",
    "reports",
    "metrics",
    "schedule",
];

/// The config files consulted when no explicit path is given, lowest priority first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/deskhand/deskhand.yaml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("deskhand/deskhand.yaml"));
    }
    paths.push(PathBuf::from("deskhand.yaml"));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<DeskhandConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a YAML string only (no files, no environment).
pub fn load_config_from_str(yaml_content: &str) -> Result<DeskhandConfig, figment::Error> {
    let figment = Figment::new().merge(Serialized::defaults(DeskhandConfig::default()));
    // An empty YAML document is null, not an empty mapping.
    if yaml_content.trim().is_empty() {
        return figment.extract();
    }
    figment.merge(Yaml::string(yaml_content)).extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DeskhandConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskhandConfig::default()))
        .merge(Yaml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the default lookup (exposed for diagnostics).
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(DeskhandConfig::default()));
    for path in default_config_paths() {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(env_provider())
}

/// Maps `DESKHAND_SLACK_TOKEN_OUT` to `slack.token_out`.
///
/// Only the leading section name is split off, so keys that contain
/// underscores keep them.
fn env_provider() -> Env {
    Env::prefixed("DESKHAND_").map(|key| {
        let key_str = key.as_str();
        for section in ENV_SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
