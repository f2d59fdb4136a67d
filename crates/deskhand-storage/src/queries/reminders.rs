// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred thread replies for unavailable users.

use deskhand_core::DeskhandError;
use deskhand_core::entities::{NewReminder, Reminder};
use rusqlite::params;

use crate::database::Database;

/// All reminders, oldest first.
pub async fn list_pending_reminders(db: &Database) -> Result<Vec<Reminder>, DeskhandError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, channel_id, thread_ts, reply_count, message
                 FROM reminders ORDER BY id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Reminder {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    channel_id: row.get(2)?,
                    thread_ts: row.get(3)?,
                    reply_count: row.get(4)?,
                    message: row.get(5)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Returns the id of the new reminder.
pub async fn create_reminder(db: &Database, reminder: &NewReminder) -> Result<i64, DeskhandError> {
    let r = reminder.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reminders (user_id, channel_id, thread_ts, reply_count, message)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![r.user_id, r.channel_id, r.thread_ts, r.reply_count, r.message],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn delete_reminder(db: &Database, id: i64) -> Result<(), DeskhandError> {
    let deleted = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM reminders WHERE id = ?1", params![id]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(DeskhandError::not_found(format!("reminder {id}")));
    }
    Ok(())
}
