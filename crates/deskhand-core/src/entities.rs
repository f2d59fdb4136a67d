// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted entities owned by the state store.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::DeskhandError;

/// A branch name or pull-request title excluded from detector action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedName {
    pub name: String,
    pub user_id: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Aging row for a branch without an open pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgottenBranch {
    pub repo_slug: String,
    pub branch_name: String,
    pub first_seen_at: DateTime<Utc>,
    /// Last bucket posted for this row. `None` on rows older than the column.
    pub notified_bucket: Option<AttentionBucket>,
}

/// Aging row for a pull request without recent activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgottenPullRequest {
    pub repo_slug: String,
    pub pull_request_id: i64,
    pub first_seen_at: DateTime<Utc>,
    pub notified_bucket: Option<AttentionBucket>,
}

/// Create/update/delete batch applied by the branch sweep in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchSweep {
    pub created: Vec<ForgottenBranch>,
    /// `(repo_slug, branch_name)` rows whose notified bucket advanced.
    pub notified: Vec<((String, String), AttentionBucket)>,
    /// `(repo_slug, branch_name)` keys to delete.
    pub deleted: Vec<(String, String)>,
}

impl BranchSweep {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.notified.is_empty() && self.deleted.is_empty()
    }
}

/// Create/update/delete batch applied by the pull-request sweep in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestSweep {
    pub created: Vec<ForgottenPullRequest>,
    pub notified: Vec<((String, i64), AttentionBucket)>,
    /// `(repo_slug, pull_request_id)` keys to delete.
    pub deleted: Vec<(String, i64)>,
}

impl PullRequestSweep {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.notified.is_empty() && self.deleted.is_empty()
    }
}

/// Marks a chat user as away for a bounded duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfkTimer {
    pub user_id: String,
    pub duration_secs: i64,
    pub updated_at: DateTime<Utc>,
}

impl AfkTimer {
    /// Saturates at the latest representable instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Duration::try_seconds(self.duration_secs)
            .and_then(|d| self.updated_at.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() > now
    }
}

/// Marks a chat user as away across an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacation {
    pub user_id: String,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub message: String,
}

impl Vacation {
    /// Builds a vacation, rejecting a range that ends before it starts.
    pub fn new(
        user_id: impl Into<String>,
        date_start: NaiveDate,
        date_end: NaiveDate,
        message: impl Into<String>,
    ) -> Result<Self, DeskhandError> {
        if date_start > date_end {
            return Err(DeskhandError::internal(format!(
                "vacation start {date_start} is after end {date_end}"
            )));
        }
        Ok(Self {
            user_id: user_id.into(),
            date_start,
            date_end,
            message: message.into(),
        })
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.date_start <= date && date <= self.date_end
    }
}

/// A deferred thread reply for a user who was unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub user_id: String,
    pub channel_id: String,
    pub thread_ts: String,
    pub reply_count: i64,
    pub message: String,
}

/// A reminder before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReminder {
    pub user_id: String,
    pub channel_id: String,
    pub thread_ts: String,
    pub reply_count: i64,
    pub message: String,
}

/// Release-bot registration: a messaging-bot user and the projects they may browse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbAuth {
    pub user_id: i64,
    pub projects: Vec<String>,
}

impl RbAuth {
    pub fn allows(&self, project_key: &str) -> bool {
        self.projects.iter().any(|p| p == project_key)
    }
}

/// Graded notification severity assigned by the aging detectors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttentionBucket {
    First,
    Second,
    Third,
}
