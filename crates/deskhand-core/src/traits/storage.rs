// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State store port.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entities::{
    AfkTimer, BranchSweep, ForgottenBranch, ForgottenPullRequest, NewReminder, ProtectedName,
    PullRequestSweep, RbAuth, Reminder, Vacation,
};
use crate::error::DeskhandError;
use crate::traits::adapter::PluginAdapter;

/// Typed persistence for the detectors' bookkeeping.
///
/// Failures are `NotFound` or `Internal`; callers never retry.
#[async_trait]
pub trait StateStore: PluginAdapter {
    // --- Protected names ---

    async fn list_protected_names(&self) -> Result<Vec<ProtectedName>, DeskhandError>;

    async fn get_protected_name(&self, name: &str) -> Result<ProtectedName, DeskhandError>;

    /// Fails if `name` is already protected.
    async fn create_protected_name(&self, row: &ProtectedName) -> Result<(), DeskhandError>;

    async fn delete_protected_name(&self, name: &str) -> Result<(), DeskhandError>;

    // --- Forgotten branches ---

    async fn list_forgotten_branches(&self) -> Result<Vec<ForgottenBranch>, DeskhandError>;

    async fn create_forgotten_branch(&self, row: &ForgottenBranch) -> Result<(), DeskhandError>;

    async fn delete_forgotten_branch(&self, repo: &str, name: &str) -> Result<(), DeskhandError>;

    /// Applies a sweep's creates and deletes atomically.
    async fn commit_branch_sweep(&self, sweep: &BranchSweep) -> Result<(), DeskhandError>;

    // --- Forgotten pull requests ---

    async fn list_forgotten_pull_requests(&self)
    -> Result<Vec<ForgottenPullRequest>, DeskhandError>;

    async fn create_forgotten_pull_request(
        &self,
        row: &ForgottenPullRequest,
    ) -> Result<(), DeskhandError>;

    async fn delete_forgotten_pull_request(&self, repo: &str, id: i64)
    -> Result<(), DeskhandError>;

    async fn commit_pull_request_sweep(&self, sweep: &PullRequestSweep)
    -> Result<(), DeskhandError>;

    // --- Availability ---

    async fn list_afk_timers(&self) -> Result<Vec<AfkTimer>, DeskhandError>;

    async fn upsert_afk_timer(&self, timer: &AfkTimer) -> Result<(), DeskhandError>;

    async fn delete_afk_timer(&self, user_id: &str) -> Result<(), DeskhandError>;

    async fn list_vacations(&self) -> Result<Vec<Vacation>, DeskhandError>;

    /// Vacations whose inclusive range contains `as_of`.
    async fn get_active_vacations(&self, as_of: NaiveDate) -> Result<Vec<Vacation>, DeskhandError>;

    async fn upsert_vacation(&self, vacation: &Vacation) -> Result<(), DeskhandError>;

    async fn delete_vacation(&self, user_id: &str) -> Result<(), DeskhandError>;

    // --- Reminders ---

    async fn list_pending_reminders(&self) -> Result<Vec<Reminder>, DeskhandError>;

    /// Returns the id assigned to the new reminder.
    async fn create_reminder(&self, reminder: &NewReminder) -> Result<i64, DeskhandError>;

    async fn delete_reminder(&self, id: i64) -> Result<(), DeskhandError>;

    // --- Release bot registrations ---

    async fn get_rb_auth(&self, user_id: i64) -> Result<RbAuth, DeskhandError>;

    /// Fails if `auth.user_id` is already registered.
    async fn create_rb_auth(&self, auth: &RbAuth) -> Result<(), DeskhandError>;

    async fn upsert_rb_auth(&self, auth: &RbAuth) -> Result<(), DeskhandError>;
}
