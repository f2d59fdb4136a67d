// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for detector and surface tests.
//!
//! `TestHarness` assembles a temp SQLite store, a fixed clock, mock ports,
//! and a [`DetectorContext`] wired to all of them.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use deskhand_config::model::{StorageConfig, UserEntry};
use deskhand_config::{DeskhandConfig, UserDirectory};
use deskhand_core::{DeskhandError, FixedClock};
use deskhand_policy::{ChatCommands, DetectorContext, Dispatcher, ReleaseBot, Webhooks};
use deskhand_storage::SqliteStore;
use tokio_util::sync::CancellationToken;

use crate::mock_bot::MockBot;
use crate::mock_chat::MockChat;
use crate::mock_ports::{MockIssueTracker, MockSourceHost, MockTimeTracker};

pub const GENERAL: &str = "C-GENERAL";
pub const DEVELOPMENT: &str = "C-DEV";
pub const MIGRATIONS: &str = "C-MIGRATIONS";
pub const REPORTS: &str = "C-REPORTS";
pub const RELEASES: &str = "C-RELEASES";
pub const TRACKER_URL: &str = "https://tracker.example.com";

/// Configuration with every channel set and no users.
pub fn test_config() -> DeskhandConfig {
    let mut config = DeskhandConfig::default();
    let channels = &mut config.slack.channels;
    channels.general = GENERAL.to_string();
    channels.development = DEVELOPMENT.to_string();
    channels.migrations = MIGRATIONS.to_string();
    channels.reports = REPORTS.to_string();
    channels.releases = RELEASES.to_string();
    config.jira.base_url = TRACKER_URL.to_string();
    config.hubstaff.org_id = 1;
    config
}

/// A directory entry with only the chat identities set.
pub fn user(chat_id: &str, chat_name: &str) -> UserEntry {
    UserEntry {
        chat_id: chat_id.to_string(),
        chat_name: chat_name.to_string(),
        ..UserEntry::default()
    }
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: DeskhandConfig,
    now: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: test_config(),
            now: Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).single().unwrap_or_default(),
        }
    }

    pub fn with_config(mut self, config: DeskhandConfig) -> Self {
        self.config = config;
        self
    }

    /// Adjust the default test configuration in place.
    pub fn configure(mut self, f: impl FnOnce(&mut DeskhandConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Build the harness, creating a fresh database.
    pub async fn build(self) -> Result<TestHarness, DeskhandError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| DeskhandError::with_source("failed to create temp dir", e))?;
        let dsn = temp_dir.path().join("test.db").to_string_lossy().to_string();

        let store = SqliteStore::new(StorageConfig {
            dsn,
            wal_mode: true,
        });
        store.initialize().await?;
        let store = Arc::new(store);

        let directory = UserDirectory::from_config(&self.config).map_err(|errors| {
            DeskhandError::internal(format!("{} invalid directory entries", errors.len()))
        })?;

        let chat = MockChat::new();
        let issues = MockIssueTracker::new();
        let source = MockSourceHost::new();
        let time = MockTimeTracker::new();
        let clock = Arc::new(FixedClock::new(self.now));
        let config = Arc::new(self.config);

        let ctx = DetectorContext {
            config: config.clone(),
            directory: Arc::new(directory),
            store: store.clone(),
            issues: Arc::new(issues.clone()),
            source: Arc::new(source.clone()),
            time: Arc::new(time.clone()),
            dispatcher: Dispatcher::new(Arc::new(chat.clone())),
            clock: clock.clone(),
            cancel: CancellationToken::new(),
        };

        Ok(TestHarness {
            chat,
            issues,
            source,
            time,
            bot: MockBot::new(),
            store,
            clock,
            config,
            ctx,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock ports and temp storage.
pub struct TestHarness {
    pub chat: MockChat,
    pub issues: MockIssueTracker,
    pub source: MockSourceHost,
    pub time: MockTimeTracker,
    pub bot: MockBot,
    pub store: Arc<SqliteStore>,
    pub clock: Arc<FixedClock>,
    pub config: Arc<DeskhandConfig>,
    pub ctx: DetectorContext,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn new() -> Result<Self, DeskhandError> {
        Self::builder().build().await
    }

    pub fn commands(&self) -> ChatCommands {
        ChatCommands::new(self.store.clone(), self.clock.clone())
    }

    pub fn release_bot(&self) -> ReleaseBot {
        ReleaseBot::new(
            Arc::new(self.bot.clone()),
            self.store.clone(),
            Arc::new(self.issues.clone()),
        )
    }

    pub fn webhooks(&self) -> Webhooks {
        Webhooks::new(
            self.config.clone(),
            self.ctx.directory.clone(),
            self.ctx.source.clone(),
            self.ctx.dispatcher.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskhand_core::StateStore;

    #[tokio::test]
    async fn harness_builds_with_empty_store() {
        let harness = TestHarness::new().await.unwrap();
        assert!(harness.store.list_pending_reminders().await.unwrap().is_empty());
        assert_eq!(harness.ctx.config.slack.channels.general, GENERAL);
    }
}
