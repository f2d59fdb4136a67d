// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging bot port (Telegram-like) used by the release browser.

use async_trait::async_trait;

use crate::error::DeskhandError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BotUpdate, KeyboardButton};

#[async_trait]
pub trait MessagingBot: PluginAdapter {
    /// Starts receiving updates from the platform.
    async fn connect(&self) -> Result<(), DeskhandError>;

    /// Waits for the next update. `None` once the update stream has closed.
    async fn next_update(&self) -> Result<Option<BotUpdate>, DeskhandError>;

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), DeskhandError>;

    /// Sends `text` with an inline keyboard, one inner `Vec` per row.
    async fn send_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        rows: Vec<Vec<KeyboardButton>>,
    ) -> Result<(), DeskhandError>;

    /// Acknowledges a button press so the client stops waiting.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), DeskhandError>;
}
