// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `deskhand migrate` and `deskhand check-config`.

use deskhand_config::{DeskhandConfig, UserDirectory};
use deskhand_core::DeskhandError;
use deskhand_storage::SqliteStore;
use deskhand_storage::migrations;

/// Opens the database, which applies every pending migration.
pub async fn run_migrate(config: &DeskhandConfig) -> Result<(), DeskhandError> {
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    println!(
        "deskhand: database {} is up to date ({} bundled migrations)",
        config.storage.dsn,
        migrations::bundled_count()
    );
    Ok(())
}

pub fn run_check_config(config: &DeskhandConfig) -> Result<(), DeskhandError> {
    let directory = UserDirectory::from_config(config).map_err(|errors| {
        deskhand_config::render_errors(&errors);
        DeskhandError::internal("user directory is invalid")
    })?;
    print!("{}", summary(config, &directory));
    Ok(())
}

fn summary(config: &DeskhandConfig, directory: &UserDirectory) -> String {
    let configured = |value: &Option<String>| match value.as_deref() {
        Some(v) if !v.is_empty() => "configured",
        _ => "missing",
    };
    let schedule = &config.schedule;

    let mut out = String::new();
    out.push_str(&format!("app:        {} (log level {})\n", config.app.name, config.app.log_level));
    out.push_str(&format!("http:       {}:{}\n", config.http.host, config.http.port));
    out.push_str(&format!("storage:    {}\n", config.storage.dsn));
    out.push_str(&format!("users:      {}\n", directory.len()));
    out.push_str(&format!("ignored:    {}\n", config.ignore.len()));
    out.push_str(&format!("slack:      {}\n", configured(&config.slack.token_out)));
    out.push_str(&format!("telegram:   {}\n", configured(&config.telegram.api_key)));
    out.push_str(&format!("hubstaff:   {}\n", configured(&config.hubstaff.token)));
    out.push_str(&format!(
        "metrics:    {}\n",
        if config.metrics.enabled { "enabled" } else { "disabled" }
    ));
    out.push_str("schedule:\n");
    for (job, spec) in [
        ("forgotten_branches", &schedule.forgotten_branches),
        ("forgotten_pull_requests", &schedule.forgotten_pull_requests),
        ("mention_reply", &schedule.mention_reply),
        ("low_priority", &schedule.low_priority),
        ("works_ratio", &schedule.works_ratio),
        ("worked_time", &schedule.worked_time),
    ] {
        out.push_str(&format!("  {job:<24} {spec}\n"));
    }
    out
}
