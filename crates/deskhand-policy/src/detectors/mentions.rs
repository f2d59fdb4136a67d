// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unanswered mentions and the reminder engine.
//!
//! Each hourly run looks at the one-hour slice of chat history that is a day
//! old, `[now - 24h, now - 23h)`. Anyone mentioned there who has neither
//! reacted nor replied gets pinged in the thread. People who are away get a
//! [`Reminder`] instead, released once they are back.
//!
//! A reminder is single-shot. The release pass makes one delivery attempt
//! and deletes the row whatever the outcome.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use deskhand_core::DeskhandError;
use deskhand_core::entities::{NewReminder, Reminder};
use deskhand_core::types::{ChatChannel, ChatMessage};
use tracing::{debug, info, warn};

use crate::availability::Availability;
use crate::context::DetectorContext;
use crate::detector::Detector;
use crate::format::mention;

/// A thread reply the run intends to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPing {
    pub channel: String,
    pub thread_ts: String,
    pub text: String,
}

/// Output of scanning one channel.
#[derive(Debug, Default)]
pub struct ChannelScan {
    pub pings: Vec<ThreadPing>,
    pub reminders: Vec<NewReminder>,
}

pub struct MentionReply;

/// `<@u1> <@u2> ^`
pub fn render_ping<'a>(users: impl IntoIterator<Item = &'a str>) -> String {
    let mut text: Vec<String> = users.into_iter().map(mention).collect();
    text.push("^".to_string());
    text.join(" ")
}

/// The `[now - 24h, now - 23h)` window as unix seconds.
pub fn scan_window(now: DateTime<Utc>) -> (i64, i64) {
    (
        (now - Duration::hours(24)).timestamp(),
        (now - Duration::hours(23)).timestamp(),
    )
}

/// Replies recorded after a reminder was captured.
///
/// Reads from index `reply_count - 1`; a capture with no replies reads all.
pub fn replies_since(anchor: &ChatMessage, reply_count: i64) -> &[ChatMessage] {
    let start = usize::try_from(reply_count.saturating_sub(1)).unwrap_or(0);
    anchor.replies.get(start..).unwrap_or(&[])
}

/// Who must be pinged about `message`, given its thread replies.
///
/// `members` has bots removed already. Returns the users to ping and the
/// reminders for users who are away, without touching any port except
/// `permalink` resolution, which the caller supplies through `permalinks`.
pub fn scan_message(
    channel: &str,
    message: &ChatMessage,
    replies: &[&ChatMessage],
    members: &BTreeSet<String>,
    availability: &Availability,
    permalinks: &HashMap<String, String>,
) -> ChannelScan {
    let mut scan = ChannelScan::default();

    let reminder = |user: &str, text: String| NewReminder {
        user_id: user.to_string(),
        channel_id: channel.to_string(),
        thread_ts: message.ts.clone(),
        reply_count: message.reply_count,
        message: text,
    };

    if message.mentions_channel() {
        let reactors = message.reactors();
        let repliers: HashSet<&str> = replies.iter().filter_map(|r| r.author()).collect();
        let author = message.author();

        let mut ping = Vec::new();
        for user in members {
            let user = user.as_str();
            if reactors.contains(user) || repliers.contains(user) || author == Some(user) {
                continue;
            }
            if availability.is_away(user) {
                scan.reminders.push(reminder(user, render_ping([user])));
            } else {
                ping.push(user);
            }
        }
        if !ping.is_empty() {
            scan.pings.push(ThreadPing {
                channel: channel.to_string(),
                thread_ts: message.ts.clone(),
                text: render_ping(ping),
            });
        }
        return scan;
    }

    // user -> ts of the message that mentioned them last
    let mut mentioned: BTreeMap<&str, &str> = BTreeMap::new();
    for user in members {
        if message.mentions(user) && !message.has_reacted(user) {
            mentioned.insert(user, &message.ts);
        }
    }
    for reply in replies {
        if let Some(author) = reply.author() {
            mentioned.remove(author);
        }
        for user in members {
            if reply.mentions(user) && !reply.has_reacted(user) {
                mentioned.insert(user, &reply.ts);
            }
        }
    }

    // permalink -> users, in first-seen order of the permalink
    let mut grouped: Vec<(String, Vec<&str>)> = Vec::new();
    for (user, ts) in mentioned {
        let Some(permalink) = permalinks.get(ts) else {
            continue;
        };
        if availability.is_away(user) {
            scan.reminders.push(reminder(
                user,
                format!("{} you were mentioned here: {permalink}", mention(user)),
            ));
            continue;
        }
        match grouped.iter_mut().find(|(p, _)| p == permalink) {
            Some((_, users)) => users.push(user),
            None => grouped.push((permalink.clone(), vec![user])),
        }
    }
    for (permalink, users) in grouped {
        scan.pings.push(ThreadPing {
            channel: channel.to_string(),
            thread_ts: message.ts.clone(),
            text: format!("{} {permalink}", render_ping(users)),
        });
    }
    scan
}

/// Timestamps whose permalinks [`scan_message`] will need.
fn permalink_targets<'a>(
    message: &'a ChatMessage,
    replies: &[&'a ChatMessage],
    members: &BTreeSet<String>,
) -> BTreeSet<&'a str> {
    let mut targets = BTreeSet::new();
    if message.mentions_channel() {
        return targets;
    }
    if members.iter().any(|u| message.mentions(u)) {
        targets.insert(message.ts.as_str());
    }
    for reply in replies {
        if members.iter().any(|u| reply.mentions(u)) {
            targets.insert(reply.ts.as_str());
        }
    }
    targets
}

impl MentionReply {
    async fn scan_channel(
        &self,
        ctx: &DetectorContext,
        channel: &ChatChannel,
        window: (i64, i64),
        bot_ids: &HashSet<String>,
        availability: &Availability,
    ) -> Result<ChannelScan, DeskhandError> {
        let members: BTreeSet<String> = channel
            .members
            .iter()
            .filter(|m| !bot_ids.contains(*m))
            .cloned()
            .collect();
        let mut out = ChannelScan::default();
        if members.is_empty() {
            return Ok(out);
        }

        let chat = ctx.dispatcher.chat();
        let history = chat.channel_history(&channel.id, window.0, window.1).await?;
        for message in history {
            ctx.ensure_running()?;
            if !message.mentions_channel() && message.is_bot(bot_ids) {
                continue;
            }
            let thread = if message.reply_count > 0 {
                chat.channel_message(&channel.id, &message.ts).await?
            } else {
                message.clone()
            };
            let replies: Vec<&ChatMessage> = thread
                .replies
                .iter()
                .filter(|r| !r.is_bot(bot_ids))
                .collect();

            let mut permalinks = HashMap::new();
            for ts in permalink_targets(&message, &replies, &members) {
                let permalink = ctx.dispatcher.permalink(&channel.id, ts).await?;
                permalinks.insert(ts.to_string(), permalink);
            }

            let scan = scan_message(
                &channel.id,
                &message,
                &replies,
                &members,
                availability,
                &permalinks,
            );
            out.pings.extend(scan.pings);
            out.reminders.extend(scan.reminders);
        }
        Ok(out)
    }

    /// Deliver reminders for users who are back, then drop them.
    async fn release_reminders(
        &self,
        ctx: &DetectorContext,
        availability: &Availability,
    ) -> Result<(), DeskhandError> {
        for reminder in ctx.store.list_pending_reminders().await? {
            if availability.is_away(&reminder.user_id) {
                continue;
            }
            ctx.ensure_running()?;
            let attempt = self.release_one(ctx, &reminder).await;
            ctx.store.delete_reminder(reminder.id).await?;
            attempt?;
        }
        Ok(())
    }

    async fn release_one(
        &self,
        ctx: &DetectorContext,
        reminder: &Reminder,
    ) -> Result<(), DeskhandError> {
        let anchor = match ctx
            .dispatcher
            .chat()
            .channel_message(&reminder.channel_id, &reminder.thread_ts)
            .await
        {
            Ok(anchor) => anchor,
            Err(e) if e.is_not_found() => {
                debug!(id = reminder.id, "anchor message is gone, dropping reminder");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let answered = replies_since(&anchor, reminder.reply_count)
            .iter()
            .any(|r| r.author() == Some(reminder.user_id.as_str()));
        if answered {
            debug!(id = reminder.id, user = %reminder.user_id, "mention already answered");
            return Ok(());
        }
        ctx.dispatcher
            .send_to_thread(&reminder.channel_id, &reminder.thread_ts, &reminder.message)
            .await?;
        info!(id = reminder.id, user = %reminder.user_id, "reminder delivered");
        Ok(())
    }

    /// Drop AFK timers that have run out.
    async fn expire_afk_timers(
        &self,
        ctx: &DetectorContext,
        now: DateTime<Utc>,
    ) -> Result<(), DeskhandError> {
        for timer in ctx.store.list_afk_timers().await? {
            if timer.is_active(now) {
                continue;
            }
            match ctx.store.delete_afk_timer(&timer.user_id).await {
                Ok(()) => debug!(user = %timer.user_id, "afk timer expired"),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Detector for MentionReply {
    fn name(&self) -> &'static str {
        "mention_reply"
    }

    async fn run(&self, ctx: &DetectorContext) -> Result<(), DeskhandError> {
        let now = ctx.clock.now();
        let window = scan_window(now);
        let bot_ids: HashSet<String> = ctx.config.slack.bot_ids.iter().cloned().collect();
        let availability = Availability::load(ctx.store.as_ref(), now).await?;

        let mut scan = ChannelScan::default();
        for channel in ctx.dispatcher.chat().list_channels().await? {
            if channel.is_archived || channel.members.is_empty() {
                continue;
            }
            ctx.ensure_running()?;
            let found = self
                .scan_channel(ctx, &channel, window, &bot_ids, &availability)
                .await?;
            scan.pings.extend(found.pings);
            scan.reminders.extend(found.reminders);
        }

        for ping in &scan.pings {
            ctx.dispatcher
                .send_to_thread(&ping.channel, &ping.thread_ts, &ping.text)
                .await?;
        }
        for reminder in &scan.reminders {
            let id = ctx.store.create_reminder(reminder).await?;
            debug!(id, user = %reminder.user_id, "reminder queued");
        }
        info!(
            pings = scan.pings.len(),
            reminders = scan.reminders.len(),
            "mention scan finished"
        );

        self.expire_afk_timers(ctx, now).await?;
        if let Err(e) = self.release_reminders(ctx, &availability).await {
            warn!(error = %e, "reminder release pass failed");
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use deskhand_core::types::Reaction;

    fn msg(ts: &str, user: &str, text: &str) -> ChatMessage {
        ChatMessage {
            ts: ts.into(),
            user: Some(user.into()),
            text: text.into(),
            ..ChatMessage::default()
        }
    }

    fn members(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn links(ts: &[&str]) -> HashMap<String, String> {
        ts.iter()
            .map(|t| (t.to_string(), format!("https://chat.example.com/p{t}")))
            .collect()
    }

    #[test]
    fn window_is_the_hour_a_day_ago() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let (oldest, latest) = scan_window(now);
        assert_eq!(latest - oldest, 3600);
        assert_eq!(now.timestamp() - oldest, 86_400);
    }

    #[test]
    fn replies_since_handles_zero_and_overflow() {
        let mut anchor = msg("1.0", "A", "hi");
        anchor.replies = vec![msg("1.1", "B", "x"), msg("1.2", "C", "y"), msg("1.3", "U", "z")];
        assert_eq!(replies_since(&anchor, 0).len(), 3);
        assert_eq!(replies_since(&anchor, 2).len(), 2);
        assert!(replies_since(&anchor, 10).is_empty());
    }

    #[test]
    fn channel_mention_pings_everyone_who_ignored_it() {
        let mut m = msg("10.0", "A", "<!channel> standup moved");
        m.reactions = vec![Reaction {
            name: "eyes".into(),
            users: vec!["B".into()],
        }];
        let reply = msg("10.1", "C", "ok");
        let away: Availability = ["E".to_string()].into_iter().collect();

        let scan = scan_message(
            "C1",
            &m,
            &[&reply],
            &members(&["A", "B", "C", "D", "E"]),
            &away,
            &HashMap::new(),
        );
        assert_eq!(scan.pings.len(), 1);
        assert_eq!(scan.pings[0].text, "<@D> ^");
        assert_eq!(scan.reminders.len(), 1);
        assert_eq!(scan.reminders[0].user_id, "E");
        assert_eq!(scan.reminders[0].thread_ts, "10.0");
    }

    #[test]
    fn replier_is_dropped_and_reply_mentions_reanchor() {
        let m = msg("20.0", "A", "<@B> <@C> can you check?");
        let r1 = msg("20.1", "B", "done, <@D> please deploy");
        let scan = scan_message(
            "C1",
            &m,
            &[&r1],
            &members(&["A", "B", "C", "D"]),
            &Availability::default(),
            &links(&["20.0", "20.1"]),
        );
        let texts: Vec<&str> = scan.pings.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "<@C> ^ https://chat.example.com/p20.0",
                "<@D> ^ https://chat.example.com/p20.1",
            ]
        );
        assert!(scan.pings.iter().all(|p| p.thread_ts == "20.0"));
    }

    #[test]
    fn reacting_counts_as_answer() {
        let mut m = msg("30.0", "A", "<@B> fyi");
        m.reactions = vec![Reaction {
            name: "+1".into(),
            users: vec!["B".into()],
        }];
        let scan = scan_message(
            "C1",
            &m,
            &[],
            &members(&["A", "B"]),
            &Availability::default(),
            &links(&["30.0"]),
        );
        assert!(scan.pings.is_empty());
        assert!(scan.reminders.is_empty());
    }

    #[test]
    fn away_user_gets_reminder_with_permalink() {
        let mut m = msg("40.0", "A", "<@U> review please");
        m.reply_count = 3;
        let away: Availability = ["U".to_string()].into_iter().collect();
        let scan = scan_message(
            "C9",
            &m,
            &[],
            &members(&["A", "U"]),
            &away,
            &links(&["40.0"]),
        );
        assert!(scan.pings.is_empty());
        let r = &scan.reminders[0];
        assert_eq!((r.channel_id.as_str(), r.thread_ts.as_str(), r.reply_count), ("C9", "40.0", 3));
        assert!(r.message.contains("<@U>"));
        assert!(r.message.contains("https://chat.example.com/p40.0"));
    }

    #[test]
    fn empty_members_produce_nothing() {
        let m = msg("50.0", "A", "<!channel> hello");
        let scan = scan_message(
            "C1",
            &m,
            &[],
            &BTreeSet::new(),
            &Availability::default(),
            &HashMap::new(),
        );
        assert!(scan.pings.is_empty());
        assert!(scan.reminders.is_empty());
    }
}
