// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vacation operations. Date ranges are inclusive on both ends.

use chrono::NaiveDate;
use deskhand_core::DeskhandError;
use deskhand_core::entities::Vacation;
use rusqlite::params;

use crate::database::Database;

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vacation> {
    Ok(Vacation {
        user_id: row.get(0)?,
        date_start: row.get(1)?,
        date_end: row.get(2)?,
        message: row.get(3)?,
    })
}

pub async fn list_vacations(db: &Database) -> Result<Vec<Vacation>, DeskhandError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, date_start, date_end, message FROM vacations ORDER BY user_id",
            )?;
            let rows = stmt.query_map([], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Vacations whose range contains `as_of`.
pub async fn get_active_vacations(
    db: &Database,
    as_of: NaiveDate,
) -> Result<Vec<Vacation>, DeskhandError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, date_start, date_end, message FROM vacations
                 WHERE date_start <= ?1 AND date_end >= ?1 ORDER BY user_id",
            )?;
            let rows = stmt.query_map(params![as_of], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn upsert_vacation(db: &Database, vacation: &Vacation) -> Result<(), DeskhandError> {
    if vacation.date_start > vacation.date_end {
        return Err(DeskhandError::internal(format!(
            "vacation start {} is after end {}",
            vacation.date_start, vacation.date_end
        )));
    }
    let vacation = vacation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO vacations (user_id, date_start, date_end, message)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     date_start = excluded.date_start,
                     date_end = excluded.date_end,
                     message = excluded.message",
                params![
                    vacation.user_id,
                    vacation.date_start,
                    vacation.date_end,
                    vacation.message
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn delete_vacation(db: &Database, user_id: &str) -> Result<(), DeskhandError> {
    let key = user_id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM vacations WHERE user_id = ?1", params![key]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(DeskhandError::not_found(format!("vacation for {user_id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_db;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[tokio::test]
    async fn active_vacations_use_inclusive_bounds() {
        let (db, _dir) = test_db().await;
        let v1 = Vacation::new("U1", date(7, 1), date(7, 10), "sea").unwrap();
        let v2 = Vacation::new("U2", date(7, 10), date(7, 12), "").unwrap();
        upsert_vacation(&db, &v1).await.unwrap();
        upsert_vacation(&db, &v2).await.unwrap();

        assert_eq!(get_active_vacations(&db, date(6, 30)).await.unwrap(), vec![]);
        assert_eq!(get_active_vacations(&db, date(7, 1)).await.unwrap(), vec![v1.clone()]);
        assert_eq!(
            get_active_vacations(&db, date(7, 10)).await.unwrap(),
            vec![v1, v2.clone()]
        );
        assert_eq!(get_active_vacations(&db, date(7, 12)).await.unwrap(), vec![v2]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_replaces_range() {
        let (db, _dir) = test_db().await;
        upsert_vacation(&db, &Vacation::new("U1", date(8, 1), date(8, 2), "a").unwrap())
            .await
            .unwrap();
        let replaced = Vacation::new("U1", date(9, 1), date(9, 5), "b").unwrap();
        upsert_vacation(&db, &replaced).await.unwrap();
        assert_eq!(list_vacations(&db).await.unwrap(), vec![replaced]);

        delete_vacation(&db, "U1").await.unwrap();
        assert!(delete_vacation(&db, "U1").await.unwrap_err().is_not_found());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn inverted_range_is_rejected_by_store() {
        let (db, _dir) = test_db().await;
        let bad = Vacation {
            user_id: "U1".into(),
            date_start: date(5, 10),
            date_end: date(5, 1),
            message: String::new(),
        };
        assert!(upsert_vacation(&db, &bad).await.is_err());
        db.close().await.unwrap();
    }
}
