// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single choke-point for chat side-effects.
//!
//! Rate limiting and retries belong to the chat adapter; the dispatcher
//! never retries.

use std::sync::Arc;

use deskhand_core::{ChatAdapter, DeskhandError};
use metrics::counter;
use tracing::debug;

/// Sends messages, thread replies, and files through the chat port.
#[derive(Clone)]
pub struct Dispatcher {
    chat: Arc<dyn ChatAdapter>,
}

fn require_channel(channel: &str) -> Result<(), DeskhandError> {
    if channel.trim().is_empty() {
        return Err(DeskhandError::internal("target channel is not configured"));
    }
    Ok(())
}

impl Dispatcher {
    pub fn new(chat: Arc<dyn ChatAdapter>) -> Self {
        Self { chat }
    }

    /// The underlying chat port, for reads.
    pub fn chat(&self) -> &Arc<dyn ChatAdapter> {
        &self.chat
    }

    pub async fn send_message(&self, channel: &str, text: &str) -> Result<(), DeskhandError> {
        require_channel(channel)?;
        self.chat.send_message(channel, text).await?;
        counter!("deskhand_notifications_total", "kind" => "message").increment(1);
        debug!(channel, "message sent");
        Ok(())
    }

    pub async fn send_to_thread(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), DeskhandError> {
        require_channel(channel)?;
        self.chat.send_to_thread(channel, thread_ts, text).await?;
        counter!("deskhand_notifications_total", "kind" => "thread").increment(1);
        debug!(channel, thread_ts, "thread reply sent");
        Ok(())
    }

    pub async fn send_file(
        &self,
        channel: &str,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<(), DeskhandError> {
        require_channel(channel)?;
        let size = bytes.len();
        self.chat
            .send_file(channel, bytes, content_type, filename)
            .await?;
        counter!("deskhand_notifications_total", "kind" => "file").increment(1);
        debug!(channel, filename, size, "file sent");
        Ok(())
    }

    pub async fn permalink(&self, channel: &str, ts: &str) -> Result<String, DeskhandError> {
        self.chat.message_permalink(channel, ts).await
    }
}
