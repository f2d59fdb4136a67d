// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Port traits for the external services and the state store.
//!
//! Every adapter extends [`PluginAdapter`] and uses `#[async_trait]` so the
//! policy engine can hold them as `Arc<dyn ...>`.

pub mod adapter;
pub mod chat;
pub mod issue_tracker;
pub mod messaging_bot;
pub mod source_host;
pub mod storage;
pub mod time_tracker;

pub use adapter::PluginAdapter;
pub use chat::ChatAdapter;
pub use issue_tracker::IssueTracker;
pub use messaging_bot::MessagingBot;
pub use source_host::SourceHost;
pub use storage::StateStore;
pub use time_tracker::TimeTracker;
