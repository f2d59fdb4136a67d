// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite state store for the Deskhand office bot.
//!
//! WAL-mode SQLite with embedded refinery migrations, a single-writer model
//! through `tokio-rusqlite`, and typed queries for every persisted entity.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
