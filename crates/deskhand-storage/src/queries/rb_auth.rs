// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Release-bot registrations.

use deskhand_core::DeskhandError;
use deskhand_core::entities::RbAuth;
use rusqlite::params;

use crate::database::Database;

fn encode_projects(projects: &[String]) -> Result<String, DeskhandError> {
    serde_json::to_string(projects)
        .map_err(|e| DeskhandError::with_source("failed to encode project list", e))
}

pub async fn get_rb_auth(db: &Database, user_id: i64) -> Result<RbAuth, DeskhandError> {
    let raw: Option<String> = db
        .connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT projects FROM rb_auth WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            );
            match result {
                Ok(projects) => Ok(Some(projects)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    let raw = raw.ok_or_else(|| DeskhandError::not_found(format!("registration for {user_id}")))?;
    let projects = serde_json::from_str(&raw)
        .map_err(|e| DeskhandError::with_source("corrupt project list in rb_auth", e))?;
    Ok(RbAuth { user_id, projects })
}

/// Register a user; fails when the user is already registered.
pub async fn create_rb_auth(db: &Database, auth: &RbAuth) -> Result<(), DeskhandError> {
    let user_id = auth.user_id;
    let projects = encode_projects(&auth.projects)?;
    let inserted = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO rb_auth (user_id, projects) VALUES (?1, ?2)",
                params![user_id, projects],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if inserted == 0 {
        return Err(DeskhandError::internal(format!(
            "user {user_id} is already registered"
        )));
    }
    Ok(())
}

pub async fn upsert_rb_auth(db: &Database, auth: &RbAuth) -> Result<(), DeskhandError> {
    let user_id = auth.user_id;
    let projects = encode_projects(&auth.projects)?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO rb_auth (user_id, projects) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET projects = excluded.projects",
                params![user_id, projects],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
