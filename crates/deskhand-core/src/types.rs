// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data exchanged with the external service ports.
//!
//! These types carry only the fields the detectors and inbound handlers
//! consume; adapters translate vendor payloads into them.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// `<@U123>` or the labelled form `<@U123|ann>`.
static USER_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@([^\s|>]+)(?:\|[^>]*)?>").expect("valid regex"));

/// Health status reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a port.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    IssueTracker,
    SourceHost,
    TimeTracker,
    Chat,
    MessagingBot,
    Storage,
    Observability,
}

// --- Issue tracker ---

/// An issue tracker account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub display_name: String,
}

/// Issue priority; a smaller id means a higher priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub id: i64,
    pub name: String,
}

/// A fix version attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixVersion {
    pub id: String,
    pub name: String,
}

impl FixVersion {
    /// Release date encoded in the version name as `<name>/YYYYMMDD`.
    pub fn release_date(&self) -> Option<NaiveDate> {
        let (_, suffix) = self.name.rsplit_once('/')?;
        NaiveDate::parse_from_str(suffix, "%Y%m%d").ok()
    }
}

/// A work-log entry attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLog {
    pub author: Option<Account>,
    pub started: DateTime<Utc>,
    pub time_spent_seconds: i64,
}

/// An issue as returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub summary: String,
    pub issue_type: String,
    pub status: String,
    pub priority: Option<Priority>,
    pub assignee: Option<Account>,
    pub due_date: Option<NaiveDate>,
    pub fix_versions: Vec<FixVersion>,
    pub worklogs: Vec<WorkLog>,
    /// Seconds logged in total.
    pub time_spent: i64,
    /// Seconds originally estimated.
    pub original_estimate: i64,
    /// Seconds still estimated.
    pub remaining_estimate: i64,
    pub resolution_date: Option<DateTime<Utc>>,
}

impl Issue {
    /// The work-log with the greatest `started` timestamp.
    pub fn latest_worklog(&self) -> Option<&WorkLog> {
        self.worklogs.iter().max_by_key(|w| w.started)
    }

    /// The earliest release date among the issue's fix versions.
    pub fn nearest_release_date(&self) -> Option<NaiveDate> {
        self.fix_versions.iter().filter_map(FixVersion::release_date).min()
    }

    pub fn priority_id(&self) -> Option<i64> {
        self.priority.as_ref().map(|p| p.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub name: String,
    pub project_id: String,
    pub released: bool,
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: String,
}

/// Issue counts for one fix version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionIssueCount {
    pub total: u64,
    pub unresolved: u64,
}

impl VersionIssueCount {
    pub fn resolved(&self) -> u64 {
        self.total.saturating_sub(self.unresolved)
    }
}

// --- Source host ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: i64,
    pub repo_slug: String,
    pub title: String,
    /// Author display name.
    pub author: String,
    pub link: String,
    pub updated_on: DateTime<Utc>,
    pub source_branch: String,
    pub destination_branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum ActivityKind {
    Approval,
    Update,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestActivity {
    pub kind: ActivityKind,
    pub author: Option<String>,
    pub date: DateTime<Utc>,
}

/// A branch that has no open pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub repo_slug: String,
    pub name: String,
    /// Author name of the branch head commit.
    pub author: String,
    pub link: String,
}

// --- Time tracker ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberActivity {
    pub user_id: i64,
    pub name: String,
    pub team: Option<String>,
    pub tracked_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub members: Vec<MemberActivity>,
}

// --- Chat ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChannel {
    pub id: String,
    pub name: String,
    pub is_archived: bool,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub name: String,
    pub users: Vec<String>,
}

/// A chat message. `replies` is populated only by `channel_message`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    pub ts: String,
    pub user: Option<String>,
    pub bot_id: Option<String>,
    pub text: String,
    pub reply_count: i64,
    pub reactions: Vec<Reaction>,
    pub replies: Vec<ChatMessage>,
}

impl ChatMessage {
    pub fn author(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Users who reacted to this message with any emoji.
    pub fn reactors(&self) -> HashSet<&str> {
        self.reactions
            .iter()
            .flat_map(|r| r.users.iter().map(String::as_str))
            .collect()
    }

    pub fn has_reacted(&self, user: &str) -> bool {
        self.reactions.iter().any(|r| r.users.iter().any(|u| u == user))
    }

    /// User ids mentioned in the text, in order of appearance.
    pub fn mentioned_users(&self) -> impl Iterator<Item = &str> {
        USER_MENTION
            .captures_iter(&self.text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Whether the text mentions `user`, with or without a display label.
    pub fn mentions(&self, user: &str) -> bool {
        self.mentioned_users().any(|u| u == user)
    }

    pub fn mentions_channel(&self) -> bool {
        self.text.contains("<!channel>")
    }

    /// Posted by an integration or by one of the configured bot users.
    pub fn is_bot(&self, bot_ids: &HashSet<String>) -> bool {
        self.bot_id.is_some() || self.user.as_ref().is_some_and(|u| bot_ids.contains(u))
    }
}

// --- Messaging bot ---

/// A slash command sent to the messaging bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCommand {
    pub chat_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub text: String,
}

/// An inline keyboard button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCallback {
    pub id: String,
    pub chat_id: i64,
    pub user_id: i64,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotUpdate {
    Command(BotCommand),
    Callback(BotCallback),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    pub text: String,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn version(name: &str) -> FixVersion {
        FixVersion {
            id: "1".into(),
            name: name.into(),
        }
    }

    #[test]
    fn fix_version_release_date_from_suffix() {
        assert_eq!(
            version("release/20260315").release_date(),
            NaiveDate::from_ymd_opt(2026, 3, 15)
        );
        assert_eq!(version("backlog").release_date(), None);
        assert_eq!(version("release/next").release_date(), None);
    }

    #[test]
    fn nearest_release_date_picks_earliest() {
        let issue = Issue {
            key: "DH-1".into(),
            summary: String::new(),
            issue_type: "Task".into(),
            status: "Open".into(),
            priority: None,
            assignee: None,
            due_date: None,
            fix_versions: vec![version("release/20260401"), version("hotfix/20260310")],
            worklogs: vec![],
            time_spent: 0,
            original_estimate: 0,
            remaining_estimate: 0,
            resolution_date: None,
        };
        assert_eq!(
            issue.nearest_release_date(),
            NaiveDate::from_ymd_opt(2026, 3, 10)
        );
    }

    #[test]
    fn latest_worklog_by_started() {
        let at = |h| Utc.with_ymd_and_hms(2026, 1, 1, h, 0, 0).unwrap();
        let log = |h| WorkLog {
            author: None,
            started: at(h),
            time_spent_seconds: 60,
        };
        let issue = Issue {
            key: "DH-2".into(),
            summary: String::new(),
            issue_type: "Task".into(),
            status: "Open".into(),
            priority: None,
            assignee: None,
            due_date: None,
            fix_versions: vec![],
            worklogs: vec![log(9), log(11), log(10)],
            time_spent: 0,
            original_estimate: 0,
            remaining_estimate: 0,
            resolution_date: None,
        };
        assert_eq!(issue.latest_worklog().map(|w| w.started), Some(at(11)));
    }

    #[test]
    fn chat_message_mentions_and_reactions() {
        let msg = ChatMessage {
            ts: "1.0".into(),
            user: Some("U1".into()),
            text: "hey <@U2> and <!channel>".into(),
            reactions: vec![Reaction {
                name: "eyes".into(),
                users: vec!["U3".into()],
            }],
            ..ChatMessage::default()
        };
        assert!(msg.mentions("U2"));
        assert!(!msg.mentions("U3"));
        assert!(msg.mentions_channel());
        assert!(msg.has_reacted("U3"));
        assert!(msg.reactors().contains("U3"));
    }

    #[test]
    fn labelled_mentions_are_recognised() {
        let msg = ChatMessage {
            text: "<@U123|ann> and <@U45> please check, not <@U1234".into(),
            ..ChatMessage::default()
        };
        assert!(msg.mentions("U123"));
        assert!(msg.mentions("U45"));
        assert!(!msg.mentions("U12"));
        assert!(!msg.mentions("U1234"));
        assert_eq!(msg.mentioned_users().collect::<Vec<_>>(), vec!["U123", "U45"]);
    }

    #[test]
    fn bot_detection_by_id_or_user() {
        let bots: HashSet<String> = ["UBOT".to_string()].into_iter().collect();
        let by_user = ChatMessage {
            user: Some("UBOT".into()),
            ..ChatMessage::default()
        };
        let by_integration = ChatMessage {
            bot_id: Some("B1".into()),
            ..ChatMessage::default()
        };
        let human = ChatMessage {
            user: Some("U1".into()),
            ..ChatMessage::default()
        };
        assert!(by_user.is_bot(&bots));
        assert!(by_integration.is_bot(&bots));
        assert!(!human.is_bot(&bots));
    }
}
