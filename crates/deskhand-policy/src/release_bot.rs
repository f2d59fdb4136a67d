// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Release browser for the messaging bot.
//!
//! `/reg` registers the sender with an empty project allow-list, `/releases`
//! offers the unreleased versions of allowed projects as buttons, and a
//! button press answers with the version's status.

use std::sync::Arc;

use deskhand_core::entities::RbAuth;
use deskhand_core::types::{
    BotCallback, BotCommand, BotUpdate, KeyboardButton, Version, VersionIssueCount,
};
use deskhand_core::{DeskhandError, IssueTracker, MessagingBot, StateStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const ACCESS_DENIED: &str = "project access denied";
pub const INTERNAL_ERROR: &str = "internal error";

/// `KEY 1.4.0: unreleased, planned 2026-11-02, resolved 3/4 (75%)`
pub fn status_line(project_key: &str, version: &Version, count: &VersionIssueCount) -> String {
    let state = if version.released { "released" } else { "unreleased" };
    let planned = version
        .release_date
        .map(|d| format!("planned {d}"))
        .unwrap_or_else(|| "no planned date".to_string());
    let percent = if count.total == 0 {
        0
    } else {
        count.resolved() * 100 / count.total
    };
    format!(
        "{project_key} {}: {state}, {planned}, resolved {}/{} ({percent}%)",
        version.name,
        count.resolved(),
        count.total
    )
}

pub struct ReleaseBot {
    bot: Arc<dyn MessagingBot>,
    store: Arc<dyn StateStore>,
    issues: Arc<dyn IssueTracker>,
}

impl ReleaseBot {
    pub fn new(
        bot: Arc<dyn MessagingBot>,
        store: Arc<dyn StateStore>,
        issues: Arc<dyn IssueTracker>,
    ) -> Self {
        Self { bot, store, issues }
    }

    /// Serves updates until `cancel` fires or the update stream closes.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), DeskhandError> {
        self.bot.connect().await?;
        info!("release bot running");

        loop {
            tokio::select! {
                update = self.bot.next_update() => {
                    match update {
                        Ok(Some(update)) => self.handle(update).await,
                        Ok(None) => {
                            info!("update stream closed");
                            break;
                        }
                        Err(e) => error!(error = %e, "failed to receive bot update"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping release bot");
                    break;
                }
            }
        }
        Ok(())
    }

    pub async fn handle(&self, update: BotUpdate) {
        match update {
            BotUpdate::Command(command) => {
                let chat_id = command.chat_id;
                let reply = match self.command(&command).await {
                    Ok(Some(reply)) => reply,
                    Ok(None) => return,
                    Err(e) => {
                        warn!(user = command.user_id, error = %e, "bot command failed");
                        INTERNAL_ERROR.to_string()
                    }
                };
                if let Err(e) = self.bot.send_message(chat_id, &reply).await {
                    warn!(chat_id, error = %e, "failed to reply");
                }
            }
            BotUpdate::Callback(callback) => {
                let reply = match self.callback(&callback).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!(user = callback.user_id, data = %callback.data, error = %e, "callback failed");
                        INTERNAL_ERROR.to_string()
                    }
                };
                if let Err(e) = self.bot.send_message(callback.chat_id, &reply).await {
                    warn!(chat_id = callback.chat_id, error = %e, "failed to reply");
                }
                if let Err(e) = self.bot.answer_callback(&callback.id).await {
                    warn!(callback = %callback.id, error = %e, "failed to acknowledge callback");
                }
            }
        }
    }

    /// `Ok(None)` when the reply was already sent (the keyboard).
    async fn command(&self, command: &BotCommand) -> Result<Option<String>, DeskhandError> {
        let name = command
            .text
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default();
        debug!(user = command.user_id, name, "bot command");

        match name {
            "/reg" => {
                match self.store.get_rb_auth(command.user_id).await {
                    Ok(_) => return Ok(Some("you are already registered".to_string())),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
                let auth = RbAuth {
                    user_id: command.user_id,
                    projects: Vec::new(),
                };
                self.store.create_rb_auth(&auth).await?;
                info!(user = command.user_id, username = ?command.username, "release bot user registered");
                Ok(Some(format!(
                    "registered as {}, ask an administrator for project access",
                    command.user_id
                )))
            }
            "/releases" => {
                let auth = match self.store.get_rb_auth(command.user_id).await {
                    Ok(auth) => auth,
                    Err(e) if e.is_not_found() => {
                        return Ok(Some("register first with /reg".to_string()));
                    }
                    Err(e) => return Err(e),
                };
                let mut rows = Vec::new();
                for project in &auth.projects {
                    for version in self.issues.list_unreleased_versions(project).await? {
                        rows.push(vec![KeyboardButton {
                            text: format!("{project} {}", version.name),
                            data: version.id,
                        }]);
                    }
                }
                if rows.is_empty() {
                    return Ok(Some("no unreleased versions".to_string()));
                }
                self.bot
                    .send_keyboard(command.chat_id, "Unreleased versions:", rows)
                    .await?;
                Ok(None)
            }
            _ => Ok(Some("unknown command, try /reg or /releases".to_string())),
        }
    }

    async fn callback(&self, callback: &BotCallback) -> Result<String, DeskhandError> {
        let auth = match self.store.get_rb_auth(callback.user_id).await {
            Ok(auth) => auth,
            Err(e) if e.is_not_found() => return Ok(ACCESS_DENIED.to_string()),
            Err(e) => return Err(e),
        };
        let version = self.issues.get_version(&callback.data).await?;
        let project = self.issues.get_project(&version.project_id).await?;
        if !auth.allows(&project.key) {
            info!(user = callback.user_id, project = %project.key, "project access denied");
            return Ok(ACCESS_DENIED.to_string());
        }
        let count = self.issues.count_issues_for_version(&version.id).await?;
        Ok(status_line(&project.key, &version, &count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn status_line_with_percentage() {
        let version = Version {
            id: "10".into(),
            name: "1.4.0".into(),
            project_id: "1".into(),
            released: false,
            release_date: NaiveDate::from_ymd_opt(2026, 11, 2),
        };
        let count = VersionIssueCount {
            total: 4,
            unresolved: 1,
        };
        assert_eq!(
            status_line("API", &version, &count),
            "API 1.4.0: unreleased, planned 2026-11-02, resolved 3/4 (75%)"
        );
    }

    #[test]
    fn empty_version_is_zero_percent() {
        let version = Version {
            id: "11".into(),
            name: "2.0".into(),
            project_id: "1".into(),
            released: true,
            release_date: None,
        };
        let count = VersionIssueCount {
            total: 0,
            unresolved: 0,
        };
        assert_eq!(
            status_line("API", &version, &count),
            "API 2.0: released, no planned date, resolved 0/0 (0%)"
        );
    }
}
