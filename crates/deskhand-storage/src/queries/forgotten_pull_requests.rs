// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forgotten pull request rows and the transactional sweep.

use deskhand_core::DeskhandError;
use deskhand_core::entities::{ForgottenPullRequest, PullRequestSweep};
use rusqlite::params;

use crate::database::Database;
use crate::queries::{bucket_column, parse_bucket};

const INSERT: &str = "INSERT OR IGNORE INTO forgotten_pull_requests
                      (repo_slug, pull_request_id, first_seen_at, notified_bucket)
                      VALUES (?1, ?2, ?3, ?4)";
const NOTIFY: &str = "UPDATE forgotten_pull_requests SET notified_bucket = ?3
                      WHERE repo_slug = ?1 AND pull_request_id = ?2";
const DELETE: &str =
    "DELETE FROM forgotten_pull_requests WHERE repo_slug = ?1 AND pull_request_id = ?2";

pub async fn list_forgotten_pull_requests(
    db: &Database,
) -> Result<Vec<ForgottenPullRequest>, DeskhandError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT repo_slug, pull_request_id, first_seen_at, notified_bucket
                 FROM forgotten_pull_requests ORDER BY repo_slug, pull_request_id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(ForgottenPullRequest {
                    repo_slug: row.get(0)?,
                    pull_request_id: row.get(1)?,
                    first_seen_at: row.get(2)?,
                    notified_bucket: parse_bucket(row.get(3)?),
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn create_forgotten_pull_request(
    db: &Database,
    row: &ForgottenPullRequest,
) -> Result<(), DeskhandError> {
    let row = row.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                INSERT,
                params![
                    row.repo_slug,
                    row.pull_request_id,
                    row.first_seen_at,
                    bucket_column(row.notified_bucket)
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn delete_forgotten_pull_request(
    db: &Database,
    repo: &str,
    id: i64,
) -> Result<(), DeskhandError> {
    let repo_key = repo.to_string();
    let deleted = db
        .connection()
        .call(move |conn| conn.execute(DELETE, params![repo_key, id]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(DeskhandError::not_found(format!(
            "forgotten pull request `{repo}#{id}`"
        )));
    }
    Ok(())
}

pub async fn commit_pull_request_sweep(
    db: &Database,
    sweep: &PullRequestSweep,
) -> Result<(), DeskhandError> {
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
                        row.pull_request_id,
                        row.first_seen_at,
                        bucket_column(row.notified_bucket)
                    ])?;
                }
                let mut notify = tx.prepare(NOTIFY)?;
                for ((repo, id), bucket) in &sweep.notified {
                    notify.execute(params![repo, id, bucket.to_string()])?;
                }
                let mut delete = tx.prepare(DELETE)?;
                for (repo, id) in &sweep.deleted {
                    delete.execute(params![repo, id])?;
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
    use chrono::{TimeZone, Utc};
    use deskhand_core::entities::AttentionBucket;

    fn make(repo: &str, id: i64) -> ForgottenPullRequest {
        ForgottenPullRequest {
            repo_slug: repo.to_string(),
            pull_request_id: id,
            first_seen_at: Utc.with_ymd_and_hms(2026, 4, 14, 8, 30, 0).unwrap(),
            notified_bucket: Some(AttentionBucket::First),
        }
    }

    #[tokio::test]
    async fn sweep_and_list() {
        let (db, _dir) = test_db().await;
        create_forgotten_pull_request(&db, &make("api", 7)).await.unwrap();
        create_forgotten_pull_request(&db, &make("api", 9)).await.unwrap();

        let sweep = PullRequestSweep {
            created: vec![make("web", 1)],
            notified: vec![(("api".into(), 9), AttentionBucket::Second)],
            deleted: vec![("api".into(), 7)],
        };
        commit_pull_request_sweep(&db, &sweep).await.unwrap();

        let mut second = make("api", 9);
        second.notified_bucket = Some(AttentionBucket::Second);
        let rows = list_forgotten_pull_requests(&db).await.unwrap();
        assert_eq!(rows, vec![second, make("web", 1)]);

        delete_forgotten_pull_request(&db, "api", 9).await.unwrap();
        assert!(
            delete_forgotten_pull_request(&db, "api", 9)
                .await
                .unwrap_err()
                .is_not_found()
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_id_in_different_repos_are_distinct() {
        let (db, _dir) = test_db().await;
        create_forgotten_pull_request(&db, &make("api", 1)).await.unwrap();
        create_forgotten_pull_request(&db, &make("web", 1)).await.unwrap();
        assert_eq!(list_forgotten_pull_requests(&db).await.unwrap().len(), 2);
        db.close().await.unwrap();
    }
}
