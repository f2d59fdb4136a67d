// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`StateStore`] port.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::debug;

use deskhand_config::model::StorageConfig;
use deskhand_core::entities::{
    AfkTimer, BranchSweep, ForgottenBranch, ForgottenPullRequest, NewReminder, ProtectedName,
    PullRequestSweep, RbAuth, Reminder, Vacation,
};
use deskhand_core::{AdapterType, DeskhandError, HealthStatus, PluginAdapter, StateStore};

use crate::database::{self, Database};
use crate::queries;

/// SQLite-backed state store.
///
/// The database is opened lazily by [`SqliteStore::initialize`]; every port
/// call before that fails with `Internal`.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database and apply pending migrations.
    pub async fn initialize(&self) -> Result<(), DeskhandError> {
        let db = Database::open_with_options(&self.config.dsn, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| DeskhandError::internal("state store already initialized"))?;
        debug!(dsn = %self.config.dsn, "sqlite state store initialized");
        Ok(())
    }

    fn db(&self) -> Result<&Database, DeskhandError> {
        self.db
            .get()
            .ok_or_else(|| DeskhandError::internal("state store not initialized"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskhandError> {
        if let Some(db) = self.db.get() {
            database::checkpoint(db.connection()).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    // --- Protected names ---

    async fn list_protected_names(&self) -> Result<Vec<ProtectedName>, DeskhandError> {
        queries::protected_names::list_protected_names(self.db()?).await
    }

    async fn get_protected_name(&self, name: &str) -> Result<ProtectedName, DeskhandError> {
        queries::protected_names::get_protected_name(self.db()?, name).await
    }

    async fn create_protected_name(&self, row: &ProtectedName) -> Result<(), DeskhandError> {
        queries::protected_names::create_protected_name(self.db()?, row).await
    }

    async fn delete_protected_name(&self, name: &str) -> Result<(), DeskhandError> {
        queries::protected_names::delete_protected_name(self.db()?, name).await
    }

    // --- Forgotten branches ---

    async fn list_forgotten_branches(&self) -> Result<Vec<ForgottenBranch>, DeskhandError> {
        queries::forgotten_branches::list_forgotten_branches(self.db()?).await
    }

    async fn create_forgotten_branch(&self, row: &ForgottenBranch) -> Result<(), DeskhandError> {
        queries::forgotten_branches::create_forgotten_branch(self.db()?, row).await
    }

    async fn delete_forgotten_branch(&self, repo: &str, name: &str) -> Result<(), DeskhandError> {
        queries::forgotten_branches::delete_forgotten_branch(self.db()?, repo, name).await
    }

    async fn commit_branch_sweep(&self, sweep: &BranchSweep) -> Result<(), DeskhandError> {
        queries::forgotten_branches::commit_branch_sweep(self.db()?, sweep).await
    }

    // --- Forgotten pull requests ---

    async fn list_forgotten_pull_requests(
        &self,
    ) -> Result<Vec<ForgottenPullRequest>, DeskhandError> {
        queries::forgotten_pull_requests::list_forgotten_pull_requests(self.db()?).await
    }

    async fn create_forgotten_pull_request(
        &self,
        row: &ForgottenPullRequest,
    ) -> Result<(), DeskhandError> {
        queries::forgotten_pull_requests::create_forgotten_pull_request(self.db()?, row).await
    }

    async fn delete_forgotten_pull_request(
        &self,
        repo: &str,
        id: i64,
    ) -> Result<(), DeskhandError> {
        queries::forgotten_pull_requests::delete_forgotten_pull_request(self.db()?, repo, id).await
    }

    async fn commit_pull_request_sweep(
        &self,
        sweep: &PullRequestSweep,
    ) -> Result<(), DeskhandError> {
        queries::forgotten_pull_requests::commit_pull_request_sweep(self.db()?, sweep).await
    }

    // --- Availability ---

    async fn list_afk_timers(&self) -> Result<Vec<AfkTimer>, DeskhandError> {
        queries::afk::list_afk_timers(self.db()?).await
    }

    async fn upsert_afk_timer(&self, timer: &AfkTimer) -> Result<(), DeskhandError> {
        queries::afk::upsert_afk_timer(self.db()?, timer).await
    }

    async fn delete_afk_timer(&self, user_id: &str) -> Result<(), DeskhandError> {
        queries::afk::delete_afk_timer(self.db()?, user_id).await
    }

    async fn list_vacations(&self) -> Result<Vec<Vacation>, DeskhandError> {
        queries::vacations::list_vacations(self.db()?).await
    }

    async fn get_active_vacations(&self, as_of: NaiveDate) -> Result<Vec<Vacation>, DeskhandError> {
        queries::vacations::get_active_vacations(self.db()?, as_of).await
    }

    async fn upsert_vacation(&self, vacation: &Vacation) -> Result<(), DeskhandError> {
        queries::vacations::upsert_vacation(self.db()?, vacation).await
    }

    async fn delete_vacation(&self, user_id: &str) -> Result<(), DeskhandError> {
        queries::vacations::delete_vacation(self.db()?, user_id).await
    }

    // --- Reminders ---

    async fn list_pending_reminders(&self) -> Result<Vec<Reminder>, DeskhandError> {
        queries::reminders::list_pending_reminders(self.db()?).await
    }

    async fn create_reminder(&self, reminder: &NewReminder) -> Result<i64, DeskhandError> {
        queries::reminders::create_reminder(self.db()?, reminder).await
    }

    async fn delete_reminder(&self, id: i64) -> Result<(), DeskhandError> {
        queries::reminders::delete_reminder(self.db()?, id).await
    }

    // --- Release bot registrations ---

    async fn get_rb_auth(&self, user_id: i64) -> Result<RbAuth, DeskhandError> {
        queries::rb_auth::get_rb_auth(self.db()?, user_id).await
    }

    async fn create_rb_auth(&self, auth: &RbAuth) -> Result<(), DeskhandError> {
        queries::rb_auth::create_rb_auth(self.db()?, auth).await
    }

    async fn upsert_rb_auth(&self, auth: &RbAuth) -> Result<(), DeskhandError> {
        queries::rb_auth::upsert_rb_auth(self.db()?, auth).await
    }
}
