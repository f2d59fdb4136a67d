// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook payloads and what the bot does with them.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use deskhand_config::{DeskhandConfig, UserDirectory};
use deskhand_core::{DeskhandError, SourceHost};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::format::{author_mention, issue_link, link};

static MIGRATION_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"((etc|db)/migrations/[0-9]{4,}([A-Za-z0-9_]+)?\.sql)").unwrap());

pub fn is_migration(path: &str) -> bool {
    MIGRATION_PATH.is_match(path)
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    pub event: String,
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    pub project: PushProject,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_avatar: String,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
    #[serde(default)]
    pub total_commits_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushProject {
    /// Numeric project id or repository slug, passed to the source host as is.
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushCommit {
    pub id: String,
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
}

fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }
    Ok(match Raw::deserialize(d)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

impl PushEvent {
    /// Migration files touched by the push, each with the last commit that
    /// touched it.
    pub fn migrations(&self) -> BTreeMap<&str, &str> {
        let mut found = BTreeMap::new();
        for commit in &self.commits {
            for path in commit.added.iter().chain(&commit.modified) {
                if is_migration(path) {
                    found.insert(path.as_str(), commit.id.as_str());
                }
            }
        }
        found
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueUpdatedEvent {
    pub issue_key: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub from_status: Option<String>,
    pub to_status: String,
    #[serde(default)]
    pub assignee: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestMergedEvent {
    pub repository: String,
    pub pull_request_id: i64,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub destination_branch: String,
    #[serde(default)]
    pub link: String,
}

/// Release and hotfix branches, e.g. `release/20261102` or `hotfix`.
pub fn is_release_branch(branch: &str) -> bool {
    ["release", "hotfix"]
        .iter()
        .any(|p| branch == *p || branch.starts_with(&format!("{p}/")))
}

/// Handles webhook events. Each handler returns once its messages are sent.
#[derive(Clone)]
pub struct Webhooks {
    config: Arc<DeskhandConfig>,
    directory: Arc<UserDirectory>,
    source: Arc<dyn SourceHost>,
    dispatcher: Dispatcher,
}

impl Webhooks {
    pub fn new(
        config: Arc<DeskhandConfig>,
        directory: Arc<UserDirectory>,
        source: Arc<dyn SourceHost>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            config,
            directory,
            source,
            dispatcher,
        }
    }

    /// Posts the contents of every migration file in the push.
    pub async fn push(&self, event: &PushEvent) -> Result<usize, DeskhandError> {
        if event.event != "push" {
            debug!(event = %event.event, "ignoring non-push event");
            return Ok(0);
        }
        if event.total_commits_count > self.config.webhooks.max_commits {
            warn!(
                project = %event.project.name,
                git_ref = %event.git_ref,
                commits = event.total_commits_count,
                "push has more commits than the payload carries, migrations may be missed"
            );
        }

        let project_id = &event.project.id;
        let migrations = event.migrations();
        for (path, commit) in &migrations {
            let bytes = self.source.get_file(project_id, path, commit).await?;
            let content = String::from_utf8_lossy(&bytes);
            let text = format!(
                "{} pushed a migration `{path}` to {} ({}):\n```\n{}\n```",
                event.user_name,
                event.project.name,
                event.git_ref,
                content.trim_end()
            );
            self.dispatcher
                .send_message(&self.config.slack.channels.migrations, &text)
                .await?;
        }
        if !migrations.is_empty() {
            info!(project = %event.project.name, count = migrations.len(), "migrations announced");
        }
        Ok(migrations.len())
    }

    /// Announces status changes listed in `webhooks.announce_statuses`.
    pub async fn issue_updated(&self, event: &IssueUpdatedEvent) -> Result<bool, DeskhandError> {
        if !self
            .config
            .webhooks
            .announce_statuses
            .iter()
            .any(|s| s == &event.to_status)
        {
            return Ok(false);
        }
        let mut text = format!(
            "{} {} moved to *{}*",
            issue_link(&self.config.jira.base_url, &event.issue_key),
            event.summary,
            event.to_status
        );
        if let Some(from) = &event.from_status {
            text.push_str(&format!(" from {from}"));
        }
        if let Some(assignee) = &event.assignee {
            text.push_str(&format!(", assignee {assignee}"));
        }
        self.dispatcher
            .send_message(&self.config.slack.channels.releases, &text)
            .await?;
        info!(issue = %event.issue_key, status = %event.to_status, "status change announced");
        Ok(true)
    }

    /// Announces merges into release and hotfix branches.
    pub async fn pull_request_merged(
        &self,
        event: &PullRequestMergedEvent,
    ) -> Result<bool, DeskhandError> {
        if !is_release_branch(&event.destination_branch) {
            return Ok(false);
        }
        let title = if event.link.is_empty() {
            event.title.clone()
        } else {
            link(&event.link, &event.title)
        };
        let text = format!(
            "Merged into `{}` in {}: {title} by {}",
            event.destination_branch,
            event.repository,
            author_mention(&self.directory, &event.author)
        );
        self.dispatcher
            .send_message(&self.config.slack.channels.releases, &text)
            .await?;
        info!(
            repo = %event.repository,
            pr = event.pull_request_id,
            branch = %event.destination_branch,
            "release merge announced"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_paths() {
        assert!(is_migration("db/migrations/0001_init.sql"));
        assert!(is_migration("services/api/etc/migrations/20260101.sql"));
        assert!(!is_migration("db/migrations/001_short.sql"));
        assert!(!is_migration("db/seeds/0001_init.sql"));
    }

    #[test]
    fn push_payload_collects_latest_commit_per_path() {
        let event: PushEvent = serde_json::from_value(serde_json::json!({
            "event": "push",
            "ref": "refs/heads/main",
            "project": {"id": 42, "name": "api"},
            "user_name": "ann",
            "user_avatar": "",
            "commits": [
                {"id": "a1", "added": ["db/migrations/0007_users.sql", "README.md"], "modified": []},
                {"id": "b2", "added": [], "modified": ["db/migrations/0007_users.sql"]}
            ],
            "total_commits_count": 2
        }))
        .unwrap();
        let migrations = event.migrations();
        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations["db/migrations/0007_users.sql"], "b2");
        assert_eq!(event.project.id, "42");
    }

    #[test]
    fn project_id_may_be_a_slug() {
        let event: PushEvent = serde_json::from_value(serde_json::json!({
            "event": "push",
            "project": {"id": "api-service"}
        }))
        .unwrap();
        assert_eq!(event.project.id, "api-service");
    }

    #[test]
    fn release_branches() {
        assert!(is_release_branch("release/20261102"));
        assert!(is_release_branch("hotfix"));
        assert!(!is_release_branch("releases"));
        assert!(!is_release_branch("main"));
    }
}
