// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion between Telegram updates and bot port types.

use deskhand_core::types::{BotCallback, BotCommand, BotUpdate, KeyboardButton};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// A text message becomes a command only when it starts with `/`.
pub fn command_update(
    chat_id: i64,
    user_id: i64,
    username: Option<String>,
    text: &str,
) -> Option<BotUpdate> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }
    Some(BotUpdate::Command(BotCommand {
        chat_id,
        user_id,
        username,
        text: text.to_string(),
    }))
}

/// Button presses without callback data carry nothing to act on.
pub fn callback_update(
    id: String,
    chat_id: i64,
    user_id: i64,
    data: Option<String>,
) -> Option<BotUpdate> {
    let data = data?;
    Some(BotUpdate::Callback(BotCallback {
        id,
        chat_id,
        user_id,
        data,
    }))
}

pub fn keyboard(rows: Vec<Vec<KeyboardButton>>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.into_iter().map(|row| {
        row.into_iter()
            .map(|b| InlineKeyboardButton::callback(b.text, b.data))
            .collect::<Vec<_>>()
    }))
}
