// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram adapter for the Deskhand release browser.
//!
//! Implements [`MessagingBot`] via teloxide long polling. Commands and
//! inline keyboard presses are forwarded into an mpsc queue that
//! [`MessagingBot::next_update`] drains.

pub mod handler;

use std::sync::Mutex;

use async_trait::async_trait;
use deskhand_config::model::TelegramConfig;
use deskhand_core::types::{AdapterType, BotUpdate, HealthStatus, KeyboardButton};
use deskhand_core::{DeskhandError, MessagingBot, PluginAdapter};
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, ChatId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram bot adapter implementing [`MessagingBot`].
pub struct TelegramBot {
    bot: Bot,
    updates_rx: tokio::sync::Mutex<mpsc::Receiver<BotUpdate>>,
    updates_tx: mpsc::Sender<BotUpdate>,
    polling_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl TelegramBot {
    /// Creates the adapter. Requires `telegram.api_key`.
    pub fn new(config: &TelegramConfig) -> Result<Self, DeskhandError> {
        let token = config
            .api_key
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DeskhandError::internal("telegram.api_key is not configured"))?;

        let (updates_tx, updates_rx) = mpsc::channel(100);
        Ok(Self {
            bot: Bot::new(token),
            updates_rx: tokio::sync::Mutex::new(updates_rx),
            updates_tx,
            polling_handle: Mutex::new(None),
        })
    }
}

fn send_error(e: teloxide::RequestError) -> DeskhandError {
    DeskhandError::with_source("telegram request failed", e)
}

async fn forward(tx: &mpsc::Sender<BotUpdate>, update: Option<BotUpdate>) {
    if let Some(update) = update {
        if tx.send(update).await.is_err() {
            warn!("update queue closed, dropping telegram update");
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramBot {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::MessagingBot
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), DeskhandError> {
        let handle = self
            .polling_handle
            .lock()
            .map_err(|_| DeskhandError::internal("telegram polling handle poisoned"))?
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        debug!("telegram adapter shut down");
        Ok(())
    }
}

#[async_trait]
impl MessagingBot for TelegramBot {
    async fn connect(&self) -> Result<(), DeskhandError> {
        let mut slot = self
            .polling_handle
            .lock()
            .map_err(|_| DeskhandError::internal("telegram polling handle poisoned"))?;
        if slot.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let message_tx = self.updates_tx.clone();
        let callback_tx = self.updates_tx.clone();
        info!("starting telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = message_tx.clone();
                    async move {
                        let Some(text) = msg.text() else {
                            return respond(());
                        };
                        let (user_id, username) = msg
                            .from
                            .as_ref()
                            .map(|u| (u.id.0 as i64, u.username.clone()))
                            .unwrap_or((msg.chat.id.0, None));
                        let update = handler::command_update(msg.chat.id.0, user_id, username, text);
                        forward(&tx, update).await;
                        respond(())
                    }
                }))
                .branch(Update::filter_callback_query().endpoint(move |q: CallbackQuery| {
                    let tx = callback_tx.clone();
                    async move {
                        let user_id = q.from.id.0 as i64;
                        // The release browser runs in private chats, where the chat id is the user id.
                        let update = handler::callback_update(q.id.to_string(), user_id, user_id, q.data);
                        forward(&tx, update).await;
                        respond(())
                    }
                }));

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        *slot = Some(handle);
        Ok(())
    }

    async fn next_update(&self) -> Result<Option<BotUpdate>, DeskhandError> {
        let mut rx = self.updates_rx.lock().await;
        Ok(rx.recv().await)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), DeskhandError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(send_error)?;
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        rows: Vec<Vec<KeyboardButton>>,
    ) -> Result<(), DeskhandError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(handler::keyboard(rows))
            .await
            .map_err(send_error)?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), DeskhandError> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()))
            .await
            .map_err(send_error)?;
        Ok(())
    }
}
