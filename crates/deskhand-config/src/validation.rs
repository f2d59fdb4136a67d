// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde cannot express: non-empty paths, schedule
//! expressions that actually parse, and team rosters that point at known users.

use std::collections::HashSet;
use std::str::FromStr;

use croner::Cron;

use crate::diagnostic::ConfigError;
use crate::directory::UserDirectory;
use crate::model::DeskhandConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &DeskhandConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.dsn.trim().is_empty() {
        errors.push(ConfigError::validation("storage.dsn must not be empty"));
    }

    if config.http.port == 0 {
        errors.push(ConfigError::validation("http.port must not be 0"));
    }

    if config.http.host.trim().is_empty() {
        errors.push(ConfigError::validation("http.host must not be empty"));
    }

    for (index, user) in config.users.iter().enumerate() {
        if user.chat_id.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "users[{index}].chat_id must not be empty"
            )));
        }
    }

    if let Err(mut directory_errors) = UserDirectory::from_config(config) {
        errors.append(&mut directory_errors);
    }

    validate_teams(config, &mut errors);
    validate_schedules(config, &mut errors);

    if config.reports.works_ratio_days < 1 {
        errors.push(ConfigError::validation(format!(
            "reports.works_ratio_days must be at least 1, got {}",
            config.reports.works_ratio_days
        )));
    }

    if config.reports.min_daily_hours < 0.0 {
        errors.push(ConfigError::validation(format!(
            "reports.min_daily_hours must be non-negative, got {}",
            config.reports.min_daily_hours
        )));
    }

    if config.slack.max_retries == 0 {
        errors.push(ConfigError::validation("slack.max_retries must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_teams(config: &DeskhandConfig, errors: &mut Vec<ConfigError>) {
    let known: HashSet<&str> = config.users.iter().map(|u| u.chat_id.as_str()).collect();
    let teams = &config.teams;

    let rosters = [
        ("backend", &teams.backend),
        ("frontend", &teams.frontend),
        ("design", &teams.design),
        ("devops", &teams.devops),
    ];
    for (team, members) in rosters {
        for member in members {
            if !known.contains(member.as_str()) {
                errors.push(ConfigError::validation(format!(
                    "teams.{team} references unknown user `{member}`"
                )));
            }
        }
    }

    let mut seen = HashSet::new();
    for (team, members) in rosters {
        for member in members {
            if !seen.insert(member.as_str()) {
                errors.push(ConfigError::validation(format!(
                    "teams.{team}: user `{member}` belongs to more than one team"
                )));
            }
        }
    }

    let roles = [
        ("backend_leader", &teams.backend_leader),
        ("frontend_leader", &teams.frontend_leader),
        ("design_leader", &teams.design_leader),
        ("devops_leader", &teams.devops_leader),
        ("project_manager", &teams.project_manager),
        ("director", &teams.director),
    ];
    for (role, holder) in roles {
        if let Some(holder) = holder
            && !known.contains(holder.as_str())
        {
            errors.push(ConfigError::validation(format!(
                "teams.{role} references unknown user `{holder}`"
            )));
        }
    }
}

fn validate_schedules(config: &DeskhandConfig, errors: &mut Vec<ConfigError>) {
    let schedule = &config.schedule;
    let entries = [
        ("forgotten_branches", &schedule.forgotten_branches),
        ("forgotten_pull_requests", &schedule.forgotten_pull_requests),
        ("mention_reply", &schedule.mention_reply),
        ("low_priority", &schedule.low_priority),
        ("works_ratio", &schedule.works_ratio),
        ("worked_time", &schedule.worked_time),
    ];
    for (name, expr) in entries {
        if let Err(e) = Cron::from_str(expr) {
            errors.push(ConfigError::InvalidSchedule {
                job: name.to_string(),
                expr: expr.to_string(),
                reason: e.to_string(),
            });
        }
    }
}
