// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per persisted entity.

pub mod afk;
pub mod forgotten_branches;
pub mod forgotten_pull_requests;
pub mod protected_names;
pub mod rb_auth;
pub mod reminders;
pub mod vacations;

use deskhand_core::entities::AttentionBucket;

/// Reads a `notified_bucket` column; unknown text counts as unrecorded.
pub(crate) fn parse_bucket(value: Option<String>) -> Option<AttentionBucket> {
    value.and_then(|v| v.parse().ok())
}

pub(crate) fn bucket_column(bucket: Option<AttentionBucket>) -> Option<String> {
    bucket.map(|b| b.to_string())
}

#[cfg(test)]
pub(crate) async fn test_db() -> (crate::Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = crate::Database::open(path.to_str().unwrap()).await.unwrap();
    (db, dir)
}
