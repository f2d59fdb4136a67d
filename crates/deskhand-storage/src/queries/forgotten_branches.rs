// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forgotten branch rows and the transactional sweep.

use deskhand_core::DeskhandError;
use deskhand_core::entities::{BranchSweep, ForgottenBranch};
use rusqlite::params;

use crate::database::Database;
use crate::queries::{bucket_column, parse_bucket};

const INSERT: &str = "INSERT OR IGNORE INTO forgotten_branches
                      (repo_slug, branch_name, first_seen_at, notified_bucket)
                      VALUES (?1, ?2, ?3, ?4)";
const NOTIFY: &str = "UPDATE forgotten_branches SET notified_bucket = ?3
                      WHERE repo_slug = ?1 AND branch_name = ?2";
const DELETE: &str = "DELETE FROM forgotten_branches WHERE repo_slug = ?1 AND branch_name = ?2";

pub async fn list_forgotten_branches(db: &Database) -> Result<Vec<ForgottenBranch>, DeskhandError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT repo_slug, branch_name, first_seen_at, notified_bucket
                 FROM forgotten_branches ORDER BY repo_slug, branch_name",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(ForgottenBranch {
                    repo_slug: row.get(0)?,
                    branch_name: row.get(1)?,
                    first_seen_at: row.get(2)?,
                    notified_bucket: parse_bucket(row.get(3)?),
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a row; an existing `(repo, branch)` keeps its original `first_seen_at`.
pub async fn create_forgotten_branch(
    db: &Database,
    row: &ForgottenBranch,
) -> Result<(), DeskhandError> {
    let row = row.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                INSERT,
                params![
                    row.repo_slug,
                    row.branch_name,
                    row.first_seen_at,
                    bucket_column(row.notified_bucket)
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn delete_forgotten_branch(
    db: &Database,
    repo: &str,
    name: &str,
) -> Result<(), DeskhandError> {
    let (repo_key, name_key) = (repo.to_string(), name.to_string());
    let deleted = db
        .connection()
        .call(move |conn| conn.execute(DELETE, params![repo_key, name_key]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(DeskhandError::not_found(format!(
            "forgotten branch `{repo}/{name}`"
        )));
    }
    Ok(())
}

/// Apply a sweep's creates, bucket updates, and deletes in one transaction.
pub async fn commit_branch_sweep(db: &Database, sweep: &BranchSweep) -> Result<(), DeskhandError> {
    if sweep.is_empty() {
        return Ok(());
    }
    let sweep = sweep.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut insert = tx.prepare(INSERT)?;
                for row in &sweep.created {
                    insert.execute(params![
                        row.repo_slug,
                        row.branch_name,
                        row.first_seen_at,
                        bucket_column(row.notified_bucket)
                    ])?;
                }
                let mut notify = tx.prepare(NOTIFY)?;
                for ((repo, name), bucket) in &sweep.notified {
                    notify.execute(params![repo, name, bucket.to_string()])?;
                }
                let mut delete = tx.prepare(DELETE)?;
                for (repo, name) in &sweep.deleted {
                    delete.execute(params![repo, name])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_db;
    use chrono::{Duration, TimeZone, Utc};
    use deskhand_core::entities::AttentionBucket;

    fn make(repo: &str, name: &str, days_ago: i64) -> ForgottenBranch {
        ForgottenBranch {
            repo_slug: repo.to_string(),
            branch_name: name.to_string(),
            first_seen_at: Utc.with_ymd_and_hms(2026, 4, 20, 10, 0, 0).unwrap()
                - Duration::days(days_ago),
            notified_bucket: Some(AttentionBucket::First),
        }
    }

    #[tokio::test]
    async fn create_keeps_first_seen_on_conflict() {
        let (db, _dir) = test_db().await;
        create_forgotten_branch(&db, &make("api", "feature/x", 3)).await.unwrap();
        create_forgotten_branch(&db, &make("api", "feature/x", 0)).await.unwrap();

        let rows = list_forgotten_branches(&db).await.unwrap();
        assert_eq!(rows, vec![make("api", "feature/x", 3)]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sweep_applies_creates_and_deletes_together() {
        let (db, _dir) = test_db().await;
        create_forgotten_branch(&db, &make("api", "old", 7)).await.unwrap();
        create_forgotten_branch(&db, &make("api", "stays", 2)).await.unwrap();

        let sweep = BranchSweep {
            created: vec![make("web", "new", 0)],
            notified: vec![],
            deleted: vec![("api".into(), "old".into()), ("api".into(), "never-existed".into())],
        };
        commit_branch_sweep(&db, &sweep).await.unwrap();

        let names: Vec<_> = list_forgotten_branches(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|b| format!("{}/{}", b.repo_slug, b.branch_name))
            .collect();
        assert_eq!(names, vec!["api/stays", "web/new"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sweep_records_notified_bucket() {
        let (db, _dir) = test_db().await;
        create_forgotten_branch(&db, &make("api", "aging", 6)).await.unwrap();
        let mut legacy = make("api", "legacy", 1);
        legacy.notified_bucket = None;
        create_forgotten_branch(&db, &legacy).await.unwrap();

        let sweep = BranchSweep {
            notified: vec![(("api".into(), "aging".into()), AttentionBucket::Second)],
            ..BranchSweep::default()
        };
        commit_branch_sweep(&db, &sweep).await.unwrap();

        let rows = list_forgotten_branches(&db).await.unwrap();
        assert_eq!(rows[0].branch_name, "aging");
        assert_eq!(rows[0].notified_bucket, Some(AttentionBucket::Second));
        assert_eq!(rows[0].first_seen_at, make("api", "aging", 6).first_seen_at);
        assert_eq!(rows[1].notified_bucket, None);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_missing_row_is_not_found() {
        let (db, _dir) = test_db().await;
        let err = delete_forgotten_branch(&db, "api", "ghost").await.unwrap_err();
        assert!(err.is_not_found());
        db.close().await.unwrap();
    }
}
