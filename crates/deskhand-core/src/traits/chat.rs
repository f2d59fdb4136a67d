// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Team chat port (Slack-like).

use async_trait::async_trait;

use crate::error::DeskhandError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatChannel, ChatMessage};

/// Reads channels and posts messages.
///
/// Implementations are safe for concurrent use and own rate limiting and
/// transient-failure retries.
#[async_trait]
pub trait ChatAdapter: PluginAdapter {
    /// All channels, including archived ones, with their member ids.
    async fn list_channels(&self) -> Result<Vec<ChatChannel>, DeskhandError>;

    /// Top-level messages with `oldest <= ts < latest` (unix seconds).
    async fn channel_history(
        &self,
        channel: &str,
        oldest: i64,
        latest: i64,
    ) -> Result<Vec<ChatMessage>, DeskhandError>;

    /// The message at `ts` with its thread replies in `replies`.
    async fn channel_message(&self, channel: &str, ts: &str) -> Result<ChatMessage, DeskhandError>;

    async fn message_permalink(&self, channel: &str, ts: &str) -> Result<String, DeskhandError>;

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), DeskhandError>;

    async fn send_to_thread(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), DeskhandError>;

    async fn send_file(
        &self,
        channel: &str,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<(), DeskhandError>;
}
