// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from slack-morphism models to the chat port types.

use deskhand_core::DeskhandError;
use deskhand_core::types::{ChatChannel, ChatMessage, Reaction};
use slack_morphism::errors::SlackClientError;
use slack_morphism::prelude::*;

/// Slack error codes that mean the addressed object does not exist.
const NOT_FOUND_ERRORS: &[&str] = &["channel_not_found", "message_not_found", "thread_not_found"];

pub fn chat_message(message: SlackHistoryMessage) -> ChatMessage {
    let reactions = message
        .content
        .reactions
        .unwrap_or_default()
        .into_iter()
        .map(|r| Reaction {
            name: r.name.0,
            users: r.users.into_iter().map(|u| u.0).collect(),
        })
        .collect();
    ChatMessage {
        ts: message.origin.ts.0,
        user: message.sender.user.map(|u| u.0),
        bot_id: message.sender.bot_id.map(|b| b.0),
        text: message.content.text.unwrap_or_default(),
        reply_count: message
            .parent
            .reply_count
            .map_or(0, |c| i64::try_from(c).unwrap_or(i64::MAX)),
        reactions,
        replies: Vec::new(),
    }
}

pub fn chat_channel(info: SlackChannelInfo, members: Vec<String>) -> ChatChannel {
    ChatChannel {
        id: info.id.0,
        name: info.name.unwrap_or_default(),
        is_archived: info.flags.is_archived.unwrap_or(false),
        members,
    }
}

/// Cursor of the next page; Slack marks the last page with an empty one.
pub fn next_cursor(meta: Option<&SlackResponseMetadata>) -> Option<SlackCursorId> {
    meta.and_then(|m| m.next_cursor.clone())
        .filter(|c| !c.0.is_empty())
}

/// Whole seconds of a Slack `ts` ("1700000000.000100").
pub fn ts_seconds(ts: &str) -> Option<i64> {
    ts.split('.').next()?.parse().ok()
}

/// Missing channels and messages become `NotFound`; everything else is internal.
pub fn slack_error(method: &str, err: SlackClientError) -> DeskhandError {
    if let SlackClientError::ApiError(api) = &err
        && NOT_FOUND_ERRORS.contains(&api.code.as_str())
    {
        return DeskhandError::not_found(format!("slack {method}: {}", api.code));
    }
    DeskhandError::with_source(format!("slack {method} failed"), err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slack_morphism::errors::SlackClientApiError;

    fn message(json: &str) -> SlackHistoryMessage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn message_defaults_missing_fields() {
        let chat = chat_message(message(r#"{"ts":"1.2"}"#));
        assert_eq!(chat.ts, "1.2");
        assert_eq!(chat.user, None);
        assert_eq!(chat.reply_count, 0);
        assert!(chat.reactions.is_empty());
        assert!(chat.text.is_empty());
    }

    #[test]
    fn message_fields_are_carried_over() {
        let chat = chat_message(message(
            r#"{
                "ts": "1700000000.000100",
                "user": "U1",
                "text": "<@U2|bob> look",
                "reply_count": 2,
                "reactions": [{"name": "eyes", "count": 1, "users": ["U2"]}]
            }"#,
        ));
        assert_eq!(chat.user.as_deref(), Some("U1"));
        assert_eq!(chat.reply_count, 2);
        assert!(chat.has_reacted("U2"));
        assert!(chat.mentions("U2"));
    }

    #[test]
    fn bot_messages_keep_bot_id() {
        let chat = chat_message(message(r#"{"ts":"3.0","bot_id":"B1","text":"deployed"}"#));
        assert_eq!(chat.bot_id.as_deref(), Some("B1"));
        assert_eq!(chat.author(), None);
    }

    #[test]
    fn archived_channel_flag_is_read() {
        let info: SlackChannelInfo = serde_json::from_str(
            r#"{"id":"C2","name":"old","created":1700000000,"is_archived":true}"#,
        )
        .unwrap();
        let channel = chat_channel(info, Vec::new());
        assert_eq!(channel.id, "C2");
        assert_eq!(channel.name, "old");
        assert!(channel.is_archived);
    }

    #[test]
    fn empty_cursor_ends_paging() {
        assert_eq!(next_cursor(None), None);
        let last: SlackResponseMetadata = serde_json::from_str(r#"{"next_cursor":""}"#).unwrap();
        assert_eq!(next_cursor(Some(&last)), None);
        let more: SlackResponseMetadata =
            serde_json::from_str(r#"{"next_cursor":"dXNlcjpVMDYxTkZUVDI="}"#).unwrap();
        assert_eq!(
            next_cursor(Some(&more)).map(|c| c.0).as_deref(),
            Some("dXNlcjpVMDYxTkZUVDI=")
        );
    }

    #[test]
    fn ts_seconds_drops_fraction() {
        assert_eq!(ts_seconds("1700000000.000100"), Some(1_700_000_000));
        assert_eq!(ts_seconds("1700000000"), Some(1_700_000_000));
        assert_eq!(ts_seconds("abc"), None);
    }

    #[test]
    fn missing_objects_map_to_not_found() {
        let err = SlackClientError::ApiError(SlackClientApiError::new("channel_not_found".into()));
        assert!(slack_error("conversations.history", err).is_not_found());

        let err = SlackClientError::ApiError(SlackClientApiError::new("invalid_auth".into()));
        let mapped = slack_error("chat.postMessage", err);
        assert!(!mapped.is_not_found());
        assert!(mapped.to_string().contains("chat.postMessage"));
    }
}
