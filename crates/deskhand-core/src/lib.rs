// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Deskhand office bot.
//!
//! Holds the port traits every adapter implements, the persisted entities,
//! the shared error type, and small helpers (clock, duration formatting)
//! used across the workspace.

pub mod clock;
pub mod duration;
pub mod entities;
pub mod error;
pub mod traits;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::DeskhandError;
pub use types::{AdapterType, HealthStatus};

pub use traits::{
    ChatAdapter, IssueTracker, MessagingBot, PluginAdapter, SourceHost, StateStore, TimeTracker,
};
