// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AFK timer operations.

use deskhand_core::DeskhandError;
use deskhand_core::entities::AfkTimer;
use rusqlite::params;

use crate::database::Database;

pub async fn list_afk_timers(db: &Database) -> Result<Vec<AfkTimer>, DeskhandError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, duration_secs, updated_at FROM afk_timers ORDER BY user_id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(AfkTimer {
                    user_id: row.get(0)?,
                    duration_secs: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace the timer for `timer.user_id`.
pub async fn upsert_afk_timer(db: &Database, timer: &AfkTimer) -> Result<(), DeskhandError> {
    if timer.duration_secs <= 0 {
        return Err(DeskhandError::internal("afk duration must be positive"));
    }
    let timer = timer.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO afk_timers (user_id, duration_secs, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                     duration_secs = excluded.duration_secs,
                     updated_at = excluded.updated_at",
                params![timer.user_id, timer.duration_secs, timer.updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn delete_afk_timer(db: &Database, user_id: &str) -> Result<(), DeskhandError> {
    let key = user_id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM afk_timers WHERE user_id = ?1", params![key]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(DeskhandError::not_found(format!("afk timer for {user_id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_db;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn upsert_is_idempotent_and_overwrites() {
        let (db, _dir) = test_db().await;
        let t0 = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        let timer = AfkTimer {
            user_id: "U1".into(),
            duration_secs: 1800,
            updated_at: t0,
        };
        upsert_afk_timer(&db, &timer).await.unwrap();
        upsert_afk_timer(&db, &timer).await.unwrap();
        assert_eq!(list_afk_timers(&db).await.unwrap(), vec![timer.clone()]);

        let later = AfkTimer {
            duration_secs: 7200,
            updated_at: t0 + Duration::hours(1),
            ..timer
        };
        upsert_afk_timer(&db, &later).await.unwrap();
        assert_eq!(list_afk_timers(&db).await.unwrap(), vec![later]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn non_positive_duration_is_rejected() {
        let (db, _dir) = test_db().await;
        let timer = AfkTimer {
            user_id: "U1".into(),
            duration_secs: 0,
            updated_at: Utc::now(),
        };
        assert!(upsert_afk_timer(&db, &timer).await.is_err());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_missing_timer_is_not_found() {
        let (db, _dir) = test_db().await;
        assert!(delete_afk_timer(&db, "U1").await.unwrap_err().is_not_found());
        db.close().await.unwrap();
    }
}
