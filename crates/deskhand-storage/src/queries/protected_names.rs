// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protected name CRUD operations.

use deskhand_core::DeskhandError;
use deskhand_core::entities::ProtectedName;
use rusqlite::params;

use crate::database::Database;

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProtectedName> {
    Ok(ProtectedName {
        name: row.get(0)?,
        user_id: row.get(1)?,
        comment: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub async fn list_protected_names(db: &Database) -> Result<Vec<ProtectedName>, DeskhandError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, user_id, comment, created_at FROM protected_names ORDER BY name",
            )?;
            let rows = stmt.query_map([], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a protected name, or `NotFound`.
pub async fn get_protected_name(db: &Database, name: &str) -> Result<ProtectedName, DeskhandError> {
    let key = name.to_string();
    let found = db
        .connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT name, user_id, comment, created_at FROM protected_names WHERE name = ?1",
                params![key],
                from_row,
            );
            match result {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    found.ok_or_else(|| DeskhandError::not_found(format!("protected name `{name}`")))
}

/// Insert a protected name; an existing name is an error.
pub async fn create_protected_name(db: &Database, row: &ProtectedName) -> Result<(), DeskhandError> {
    let row = row.clone();
    let name = row.name.clone();
    let inserted = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO protected_names (name, user_id, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![row.name, row.user_id, row.comment, row.created_at],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if inserted == 0 {
        return Err(DeskhandError::internal(format!(
            "`{name}` is already protected"
        )));
    }
    Ok(())
}

pub async fn delete_protected_name(db: &Database, name: &str) -> Result<(), DeskhandError> {
    let key = name.to_string();
    let deleted = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM protected_names WHERE name = ?1", params![key]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if deleted == 0 {
        return Err(DeskhandError::not_found(format!("protected name `{name}`")));
    }
    Ok(())
}
