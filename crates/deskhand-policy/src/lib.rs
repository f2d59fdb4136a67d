// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy layer of the Deskhand office bot.
//!
//! Detectors compare live third-party state with the persisted snapshot and
//! emit graded chat notifications through the [`Dispatcher`]. Chat commands,
//! webhooks, and the release bot share the same ports.

pub mod availability;
pub mod commands;
pub mod context;
pub mod detector;
pub mod detectors;
pub mod dispatch;
pub mod format;
pub mod release_bot;
pub mod webhooks;

pub use availability::Availability;
pub use commands::{ChatCommand, ChatCommands};
pub use context::DetectorContext;
pub use detector::{Detector, DetectorJob, all_detectors, register_detectors};
pub use dispatch::Dispatcher;
pub use release_bot::ReleaseBot;
pub use webhooks::{IssueUpdatedEvent, PullRequestMergedEvent, PushEvent, Webhooks};
