// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::time::Duration;

use deskhand_core::DeskhandError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, DeskhandError> {
        Self::open_with_options(path, true).await
    }

    /// Open the database, choosing the journal mode explicitly.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, DeskhandError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DeskhandError::with_source(
                    format!("cannot create database directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| DeskhandError::with_source(format!("cannot open database {path}"), e))?;

        conn.call(move |conn| -> Result<(), DeskhandError> {
            apply_pragmas(conn, wal_mode)
                .map_err(|e| DeskhandError::with_source("failed to configure database", e))?;
            migrations::run_migrations(conn)
        })
        .await
        .map_err(|e| DeskhandError::with_source("database initialization failed", e))?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), DeskhandError> {
        checkpoint(&self.conn).await?;
        self.conn
            .close()
            .await
            .map_err(|e| DeskhandError::with_source("failed to close database", e))?;
        debug!("database closed");
        Ok(())
    }
}

fn apply_pragmas(conn: &mut rusqlite::Connection, wal_mode: bool) -> Result<(), rusqlite::Error> {
    if wal_mode {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "journal mode set");
    }
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(())
}

/// Truncate the WAL into the main database file.
pub async fn checkpoint(conn: &tokio_rusqlite::Connection) -> Result<(), DeskhandError> {
    conn.call(|conn| -> Result<(), rusqlite::Error> {
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    })
    .await
    .map_err(map_tr_err)
}

/// Convert a tokio-rusqlite error into `DeskhandError::Internal`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> DeskhandError {
    DeskhandError::with_source("database error", e)
}
