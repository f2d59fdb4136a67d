// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging bot with injected updates.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use deskhand_core::traits::adapter::PluginAdapter;
use deskhand_core::traits::messaging_bot::MessagingBot;
use deskhand_core::types::{AdapterType, BotUpdate, HealthStatus, KeyboardButton};
use deskhand_core::DeskhandError;

#[derive(Default)]
struct State {
    updates: VecDeque<BotUpdate>,
    connected: bool,
    messages: Vec<(i64, String)>,
    keyboards: Vec<(i64, String, Vec<Vec<KeyboardButton>>)>,
    answered: Vec<String>,
}

/// A mock messaging bot for testing.
///
/// `next_update` drains the injected queue and then reports the stream as
/// closed, so `ReleaseBot::run` returns once every update is handled.
#[derive(Clone, Default)]
pub struct MockBot {
    state: Arc<Mutex<State>>,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn inject(&self, update: BotUpdate) {
        self.state.lock().await.updates.push_back(update);
    }

    pub async fn connected(&self) -> bool {
        self.state.lock().await.connected
    }

    /// `(chat_id, text)` of every plain message sent.
    pub async fn messages(&self) -> Vec<(i64, String)> {
        self.state.lock().await.messages.clone()
    }

    pub async fn keyboards(&self) -> Vec<(i64, String, Vec<Vec<KeyboardButton>>)> {
        self.state.lock().await.keyboards.clone()
    }

    /// Ids of acknowledged callbacks.
    pub async fn answered(&self) -> Vec<String> {
        self.state.lock().await.answered.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockBot {
    fn name(&self) -> &str {
        "mock-bot"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::MessagingBot
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskhandError> {
        Ok(())
    }
}

#[async_trait]
impl MessagingBot for MockBot {
    async fn connect(&self) -> Result<(), DeskhandError> {
        self.state.lock().await.connected = true;
        Ok(())
    }

    async fn next_update(&self) -> Result<Option<BotUpdate>, DeskhandError> {
        Ok(self.state.lock().await.updates.pop_front())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), DeskhandError> {
        self.state
            .lock()
            .await
            .messages
            .push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        rows: Vec<Vec<KeyboardButton>>,
    ) -> Result<(), DeskhandError> {
        self.state
            .lock()
            .await
            .keyboards
            .push((chat_id, text.to_string(), rows));
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), DeskhandError> {
        self.state
            .lock()
            .await
            .answered
            .push(callback_id.to_string());
        Ok(())
    }
}
