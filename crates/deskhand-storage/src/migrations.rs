// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary. Startup refuses
//! to continue when a bundled migration older than the latest applied one was
//! never applied, or when an applied migration's checksum differs.

use deskhand_core::DeskhandError;
use tracing::info;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Validate and apply all pending migrations.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), DeskhandError> {
    let report = embedded::migrations::runner()
        .set_abort_missing(true)
        .set_abort_divergent(true)
        .run(conn)
        .map_err(|e| DeskhandError::with_source("database migration failed", e))?;

    for migration in report.applied_migrations() {
        info!(
            version = migration.version(),
            name = %migration.name(),
            "applied migration"
        );
    }
    Ok(())
}

/// Number of migrations compiled into this binary.
pub fn bundled_count() -> usize {
    embedded::migrations::runner().get_migrations().len()
}
