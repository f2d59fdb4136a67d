// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Deskhand integration tests.
//!
//! Provides mock ports and test harness infrastructure for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockChat`] - chat port with seeded history and captured sends
//! - [`MockIssueTracker`], [`MockSourceHost`], [`MockTimeTracker`] - seeded read ports
//! - [`MockBot`] - messaging bot with injected updates
//! - [`TestHarness`] - temp store, fixed clock, and a ready [`deskhand_policy::DetectorContext`]

pub mod harness;
pub mod mock_bot;
pub mod mock_chat;
pub mod mock_ports;

pub use harness::{TestHarness, TestHarnessBuilder, test_config, user};
pub use mock_bot::MockBot;
pub use mock_chat::{MockChat, Sent};
pub use mock_ports::{MockIssueTracker, MockSourceHost, MockTimeTracker};
