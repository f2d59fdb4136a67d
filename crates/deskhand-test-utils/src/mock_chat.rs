// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat port.
//!
//! `MockChat` serves seeded channels, history, and threads, and captures
//! every outbound message for assertion in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use deskhand_core::traits::adapter::PluginAdapter;
use deskhand_core::traits::chat::ChatAdapter;
use deskhand_core::types::{AdapterType, ChatChannel, ChatMessage, HealthStatus};
use deskhand_core::DeskhandError;

/// One captured outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message {
        channel: String,
        text: String,
    },
    Thread {
        channel: String,
        thread_ts: String,
        text: String,
    },
    File {
        channel: String,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl Sent {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Message { text, .. } | Self::Thread { text, .. } => Some(text),
            Self::File { .. } => None,
        }
    }
}

#[derive(Default)]
struct State {
    channels: Vec<ChatChannel>,
    history: HashMap<String, Vec<ChatMessage>>,
    sent: Vec<Sent>,
    fail_sends: bool,
}

/// A mock chat workspace for testing.
#[derive(Clone, Default)]
pub struct MockChat {
    state: Arc<Mutex<State>>,
}

/// Whole seconds of a chat timestamp such as `1700000000.000100`.
fn ts_seconds(ts: &str) -> i64 {
    ts.split('.').next().and_then(|s| s.parse().ok()).unwrap_or(0)
}

pub fn permalink_for(channel: &str, ts: &str) -> String {
    format!("https://chat.example.com/archives/{channel}/p{}", ts.replace('.', ""))
}

impl MockChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_channel(&self, id: &str, members: &[&str]) {
        self.state.lock().await.channels.push(ChatChannel {
            id: id.to_string(),
            name: id.to_lowercase(),
            is_archived: false,
            members: members.iter().map(|m| m.to_string()).collect(),
        });
    }

    /// Seeds a top-level message. Its `replies` are served by `channel_message`.
    pub async fn add_message(&self, channel: &str, message: ChatMessage) {
        self.state
            .lock()
            .await
            .history
            .entry(channel.to_string())
            .or_default()
            .push(message);
    }

    /// Appends a reply to an existing thread.
    pub async fn add_reply(&self, channel: &str, thread_ts: &str, reply: ChatMessage) {
        let mut state = self.state.lock().await;
        if let Some(anchor) = state
            .history
            .get_mut(channel)
            .and_then(|h| h.iter_mut().find(|m| m.ts == thread_ts))
        {
            anchor.reply_count += 1;
            anchor.replies.push(reply);
        }
    }

    pub async fn remove_message(&self, channel: &str, ts: &str) {
        if let Some(history) = self.state.lock().await.history.get_mut(channel) {
            history.retain(|m| m.ts != ts);
        }
    }

    /// Makes every send fail with an internal error.
    pub async fn fail_sends(&self, fail: bool) {
        self.state.lock().await.fail_sends = fail;
    }

    pub async fn sent(&self) -> Vec<Sent> {
        self.state.lock().await.sent.clone()
    }

    /// Text of every captured message and thread reply, in order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent()
            .await
            .iter()
            .filter_map(|s| s.text().map(str::to_string))
            .collect()
    }

    pub async fn clear_sent(&self) {
        self.state.lock().await.sent.clear();
    }

    async fn record(&self, sent: Sent) -> Result<(), DeskhandError> {
        let mut state = self.state.lock().await;
        if state.fail_sends {
            return Err(DeskhandError::internal("mock chat send failure"));
        }
        state.sent.push(sent);
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MockChat {
    fn name(&self) -> &str {
        "mock-chat"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Chat
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskhandError> {
        Ok(())
    }
}

#[async_trait]
impl ChatAdapter for MockChat {
    async fn list_channels(&self) -> Result<Vec<ChatChannel>, DeskhandError> {
        Ok(self.state.lock().await.channels.clone())
    }

    async fn channel_history(
        &self,
        channel: &str,
        oldest: i64,
        latest: i64,
    ) -> Result<Vec<ChatMessage>, DeskhandError> {
        let state = self.state.lock().await;
        Ok(state
            .history
            .get(channel)
            .map(|h| {
                h.iter()
                    .filter(|m| (oldest..latest).contains(&ts_seconds(&m.ts)))
                    .map(|m| ChatMessage {
                        replies: Vec::new(),
                        ..m.clone()
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn channel_message(&self, channel: &str, ts: &str) -> Result<ChatMessage, DeskhandError> {
        let state = self.state.lock().await;
        state
            .history
            .get(channel)
            .and_then(|h| h.iter().find(|m| m.ts == ts))
            .cloned()
            .ok_or_else(|| DeskhandError::not_found(format!("message {channel}/{ts}")))
    }

    async fn message_permalink(&self, channel: &str, ts: &str) -> Result<String, DeskhandError> {
        Ok(permalink_for(channel, ts))
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), DeskhandError> {
        self.record(Sent::Message {
            channel: channel.to_string(),
            text: text.to_string(),
        })
        .await
    }

    async fn send_to_thread(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), DeskhandError> {
        self.record(Sent::Thread {
            channel: channel.to_string(),
            thread_ts: thread_ts.to_string(),
            text: text.to_string(),
        })
        .await
    }

    async fn send_file(
        &self,
        channel: &str,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<(), DeskhandError> {
        self.record(Sent::File {
            channel: channel.to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes,
        })
        .await
    }
}
