// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slack chat adapter for Deskhand.
//!
//! Implements [`ChatAdapter`] on slack-morphism's Web API client: channel
//! listing with members, history and thread reads, permalinks, posting to
//! channels and threads, and file uploads through the external upload flow.
//! Tier limits, `Retry-After`, and retries are left to slack-morphism's rate
//! control.

pub mod convert;

use std::time::Duration;

use async_trait::async_trait;
use deskhand_config::model::SlackConfig;
use deskhand_core::types::{AdapterType, ChatChannel, ChatMessage, HealthStatus};
use deskhand_core::{ChatAdapter, DeskhandError, PluginAdapter};
use slack_morphism::prelude::*;
use tracing::{debug, info};

use crate::convert::{chat_channel, chat_message, next_cursor, slack_error, ts_seconds};

/// Chat adapter backed by the Slack Web API.
pub struct SlackChat {
    client: SlackHyperClient,
    token: SlackApiToken,
}

/// Rate control derived from the `slack` config section.
pub fn rate_control(config: &SlackConfig) -> SlackApiRateControlConfig {
    let mut rate = SlackApiRateControlConfig::new().with_max_retries(config.max_retries as usize);
    if config.min_post_interval_ms > 0 {
        rate = rate.with_team_max_rate_limit(SlackApiRateControlLimit::new(
            1,
            Duration::from_millis(config.min_post_interval_ms),
        ));
    }
    rate
}

impl SlackChat {
    /// Creates the adapter from configuration.
    ///
    /// Fails when no outgoing bot token is configured.
    pub fn new(config: &SlackConfig) -> Result<Self, DeskhandError> {
        let token = config
            .token_out
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DeskhandError::internal("slack.token_out is not configured"))?;

        let connector = SlackClientHyperConnector::new()
            .map_err(|e| DeskhandError::internal(format!("failed to build slack connector: {e}")))?
            .with_slack_api_url(config.base_url.trim_end_matches('/'))
            .with_rate_control(rate_control(config));

        info!(base_url = %config.base_url, "slack adapter initialized");
        Ok(Self {
            client: SlackClient::new(connector),
            token: SlackApiToken::new(SlackApiTokenValue(token.to_string())),
        })
    }

    fn session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.token)
    }

    async fn channel_members(&self, channel: &SlackChannelId) -> Result<Vec<String>, DeskhandError> {
        let session = self.session();
        let mut members = Vec::new();
        let mut cursor = None;
        loop {
            let request = SlackApiConversationsMembersRequest::new()
                .with_channel(channel.clone())
                .with_limit(200)
                .opt_cursor(cursor.take());
            let page = session
                .conversations_members(&request)
                .await
                .map_err(|e| slack_error("conversations.members", e))?;
            members.extend(page.members.into_iter().map(|u| u.0));
            match next_cursor(page.response_metadata.as_ref()) {
                Some(next) => cursor = Some(next),
                None => return Ok(members),
            }
        }
    }

    async fn post_message(
        &self,
        channel: &str,
        thread_ts: Option<&str>,
        text: &str,
    ) -> Result<(), DeskhandError> {
        let request = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        )
        .opt_thread_ts(thread_ts.map(|ts| SlackTs(ts.to_string())))
        .with_unfurl_links(false);
        self.session()
            .chat_post_message(&request)
            .await
            .map_err(|e| slack_error("chat.postMessage", e))?;
        debug!(channel, thread_ts, "slack message posted");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SlackChat {
    fn name(&self) -> &str {
        "slack"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Chat
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
        match self.session().auth_test().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), DeskhandError> {
        debug!("slack adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChatAdapter for SlackChat {
    async fn list_channels(&self) -> Result<Vec<ChatChannel>, DeskhandError> {
        let session = self.session();
        let mut listed = Vec::new();
        let mut cursor = None;
        loop {
            let request = SlackApiConversationsListRequest::new()
                .with_types(vec![SlackConversationType::Public, SlackConversationType::Private])
                .with_limit(200)
                .opt_cursor(cursor.take());
            let page = session
                .conversations_list(&request)
                .await
                .map_err(|e| slack_error("conversations.list", e))?;
            listed.extend(page.channels);
            match next_cursor(page.response_metadata.as_ref()) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let mut channels = Vec::with_capacity(listed.len());
        for info in listed {
            // Archived channels reject member listing.
            let members = if info.flags.is_archived.unwrap_or(false) {
                Vec::new()
            } else {
                self.channel_members(&info.id).await?
            };
            channels.push(chat_channel(info, members));
        }
        Ok(channels)
    }

    async fn channel_history(
        &self,
        channel: &str,
        oldest: i64,
        latest: i64,
    ) -> Result<Vec<ChatMessage>, DeskhandError> {
        let session = self.session();
        let mut messages = Vec::new();
        let mut cursor = None;
        loop {
            let request = SlackApiConversationsHistoryRequest::new()
                .with_channel(SlackChannelId(channel.to_string()))
                .with_oldest(SlackTs(oldest.to_string()))
                .with_latest(SlackTs(latest.to_string()))
                .with_inclusive(true)
                .with_limit(200)
                .opt_cursor(cursor.take());
            let page = session
                .conversations_history(&request)
                .await
                .map_err(|e| slack_error("conversations.history", e))?;
            messages.extend(page.messages.into_iter().map(chat_message));
            match next_cursor(page.response_metadata.as_ref()) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        // `latest` is inclusive on the wire, exclusive here.
        Ok(messages
            .into_iter()
            .filter(|m| ts_seconds(&m.ts).is_some_and(|s| s >= oldest && s < latest))
            .collect())
    }

    async fn channel_message(&self, channel: &str, ts: &str) -> Result<ChatMessage, DeskhandError> {
        let session = self.session();
        let mut messages = Vec::new();
        let mut cursor = None;
        loop {
            let request = SlackApiConversationsRepliesRequest::new(
                SlackChannelId(channel.to_string()),
                SlackTs(ts.to_string()),
            )
            .with_limit(200)
            .opt_cursor(cursor.take());
            let page = session
                .conversations_replies(&request)
                .await
                .map_err(|e| slack_error("conversations.replies", e))?;
            messages.extend(page.messages.into_iter().map(chat_message));
            match next_cursor(page.response_metadata.as_ref()) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        split_thread(messages, ts)
            .ok_or_else(|| DeskhandError::not_found(format!("message {channel}/{ts}")))
    }

    async fn message_permalink(&self, channel: &str, ts: &str) -> Result<String, DeskhandError> {
        let request = SlackApiChatGetPermalinkRequest::new(
            SlackChannelId(channel.to_string()),
            SlackTs(ts.to_string()),
        );
        let link = self
            .session()
            .chat_get_permalink(&request)
            .await
            .map_err(|e| slack_error("chat.getPermalink", e))?;
        Ok(link.permalink.to_string())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), DeskhandError> {
        self.post_message(channel, None, text).await
    }

    async fn send_to_thread(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), DeskhandError> {
        self.post_message(channel, Some(thread_ts), text).await
    }

    async fn send_file(
        &self,
        channel: &str,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<(), DeskhandError> {
        let session = self.session();
        let target = session
            .get_upload_url_external(&SlackApiFilesGetUploadUrlExternalRequest::new(
                filename.to_string(),
                bytes.len(),
            ))
            .await
            .map_err(|e| slack_error("files.getUploadURLExternal", e))?;
        session
            .files_upload_via_url(&SlackApiFilesUploadViaUrlRequest::new(
                target.upload_url,
                bytes,
                content_type.to_string(),
            ))
            .await
            .map_err(|e| slack_error("files upload", e))?;

        let complete = SlackApiFilesCompleteUploadExternalRequest::new(vec![
            SlackApiFilesComplete::new(target.file_id).with_title(filename.to_string()),
        ])
        .with_channel_id(SlackChannelId(channel.to_string()));
        session
            .files_complete_upload_external(&complete)
            .await
            .map_err(|e| slack_error("files.completeUploadExternal", e))?;
        info!(channel, filename, "file shared");
        Ok(())
    }
}

/// Picks the parent `ts` out of a `conversations.replies` listing and hangs
/// the rest under it.
fn split_thread(mut messages: Vec<ChatMessage>, ts: &str) -> Option<ChatMessage> {
    let position = messages.iter().position(|m| m.ts == ts)?;
    let mut parent = messages.remove(position);
    parent.replies = messages;
    Some(parent)
}
