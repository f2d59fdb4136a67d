// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for chat commands, the release bot, and webhooks.

use chrono::{Duration, NaiveDate};
use deskhand_core::entities::RbAuth;
use deskhand_core::types::{
    BotCallback, BotCommand, BotUpdate, Project, Version, VersionIssueCount,
};
use deskhand_core::{Clock, StateStore};
use deskhand_policy::release_bot::{ACCESS_DENIED, INTERNAL_ERROR};
use deskhand_policy::{IssueUpdatedEvent, PullRequestMergedEvent, PushEvent};
use deskhand_test_utils::harness::{MIGRATIONS, RELEASES};
use deskhand_test_utils::{Sent, TestHarness};
use tokio_util::sync::CancellationToken;

// --- chat commands ---

#[tokio::test]
async fn protect_list_and_unprotect() {
    let h = TestHarness::new().await.unwrap();
    let commands = h.commands();

    assert_eq!(
        commands.handle("U1", "/protect", "feature/demo for the expo").await,
        "`feature/demo` is protected now"
    );
    assert_eq!(
        commands.handle("U2", "/protect", "feature/demo").await,
        "`feature/demo` is already protected by <@U1>"
    );
    assert_eq!(
        commands.handle("U2", "/protected", "").await,
        "• `feature/demo` by <@U1>: for the expo"
    );
    assert_eq!(
        commands.handle("U1", "/unprotect", "feature/demo").await,
        "`feature/demo` is no longer protected"
    );
    assert_eq!(
        commands.handle("U1", "/unprotect", "feature/demo").await,
        "`feature/demo` is not protected"
    );
    assert_eq!(commands.handle("U1", "/protected", "").await, "nothing is protected");
}

#[tokio::test]
async fn skip_protects_pull_request_title() {
    let h = TestHarness::new().await.unwrap();
    h.commands().handle("U1", "/skip", "WIP: big refactor").await;

    let row = h.store.get_protected_name("WIP: big refactor").await.unwrap();
    assert_eq!(row.user_id, "U1");
    assert_eq!(row.comment, "skip");
}

#[tokio::test]
async fn afk_and_back() {
    let h = TestHarness::new().await.unwrap();
    let commands = h.commands();

    assert_eq!(
        commands.handle("U1", "/afk", "1h30m").await,
        "you are away for 1h 30m"
    );
    // upsert: a second /afk replaces the first
    commands.handle("U1", "/afk", "2h").await;
    let timers = h.store.list_afk_timers().await.unwrap();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].duration_secs, 7200);
    assert_eq!(timers[0].updated_at, h.clock.now());

    assert_eq!(commands.handle("U1", "/back", "").await, "welcome back");
    assert_eq!(commands.handle("U1", "/back", "").await, "you were not away");
    assert!(
        commands
            .handle("U1", "/afk", "soon")
            .await
            .contains("invalid duration")
    );
}

#[tokio::test]
async fn vacation_is_recorded_and_validated() {
    let h = TestHarness::new().await.unwrap();
    let commands = h.commands();

    assert_eq!(
        commands
            .handle("U1", "/vacation", "2026-10-20 2026-10-24 hiking")
            .await,
        "vacation recorded from 2026-10-20 to 2026-10-24"
    );
    let active = h
        .store
        .get_active_vacations(NaiveDate::from_ymd_opt(2026, 10, 22).unwrap())
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].message, "hiking");

    assert!(
        commands
            .handle("U1", "/vacation", "2026-10-24 2026-10-20")
            .await
            .starts_with("vacation can not end")
    );
    assert!(
        commands
            .handle("U1", "/vacation", "tomorrow 2026-10-20")
            .await
            .contains("is not a date")
    );
}

#[tokio::test]
async fn unknown_command_gets_a_reply() {
    let h = TestHarness::new().await.unwrap();
    assert_eq!(
        h.commands().handle("U1", "/deploy", "prod").await,
        "unknown command `/deploy`"
    );
}

// --- release bot ---

fn command(user_id: i64, text: &str) -> BotUpdate {
    BotUpdate::Command(BotCommand {
        chat_id: 500 + user_id,
        user_id,
        username: None,
        text: text.into(),
    })
}

fn callback(user_id: i64, data: &str) -> BotUpdate {
    BotUpdate::Callback(BotCallback {
        id: format!("cb-{user_id}-{data}"),
        chat_id: 500 + user_id,
        user_id,
        data: data.into(),
    })
}

async fn seed_versions(h: &TestHarness) {
    h.issues
        .add_project(Project {
            id: "100".into(),
            key: "API".into(),
            name: "Api".into(),
        })
        .await;
    h.issues
        .add_project(Project {
            id: "200".into(),
            key: "WEB".into(),
            name: "Web".into(),
        })
        .await;
    h.issues
        .add_version(
            Version {
                id: "10".into(),
                name: "1.4.0".into(),
                project_id: "100".into(),
                released: false,
                release_date: NaiveDate::from_ymd_opt(2026, 11, 2),
            },
            VersionIssueCount {
                total: 4,
                unresolved: 1,
            },
        )
        .await;
    h.issues
        .add_version(
            Version {
                id: "20".into(),
                name: "3.0.0".into(),
                project_id: "200".into(),
                released: false,
                release_date: None,
            },
            VersionIssueCount::default(),
        )
        .await;
}

#[tokio::test]
async fn registration_is_unique() {
    let h = TestHarness::new().await.unwrap();
    h.bot.inject(command(1, "/reg")).await;
    h.bot.inject(command(1, "/reg@deskhand_bot")).await;

    h.release_bot().run(CancellationToken::new()).await.unwrap();

    assert!(h.bot.connected().await);
    let messages = h.bot.messages().await;
    assert_eq!(messages.len(), 2);
    assert!(messages[0].1.starts_with("registered as 1"));
    assert_eq!(messages[1].1, "you are already registered");
    assert_eq!(
        h.store.get_rb_auth(1).await.unwrap(),
        RbAuth {
            user_id: 1,
            projects: Vec::new(),
        }
    );
}

#[tokio::test]
async fn releases_lists_allowed_projects_only() {
    let h = TestHarness::new().await.unwrap();
    seed_versions(&h).await;
    h.store
        .upsert_rb_auth(&RbAuth {
            user_id: 7,
            projects: vec!["API".into()],
        })
        .await
        .unwrap();
    h.bot.inject(command(7, "/releases")).await;
    h.bot.inject(command(8, "/releases")).await;

    h.release_bot().run(CancellationToken::new()).await.unwrap();

    let keyboards = h.bot.keyboards().await;
    assert_eq!(keyboards.len(), 1);
    let (chat_id, _, rows) = &keyboards[0];
    assert_eq!(*chat_id, 507);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].text, "API 1.4.0");
    assert_eq!(rows[0][0].data, "10");
    assert_eq!(
        h.bot.messages().await,
        vec![(508, "register first with /reg".to_string())]
    );
}

#[tokio::test]
async fn callback_checks_project_access_and_is_always_answered() {
    let h = TestHarness::new().await.unwrap();
    seed_versions(&h).await;
    h.store
        .upsert_rb_auth(&RbAuth {
            user_id: 7,
            projects: vec!["API".into()],
        })
        .await
        .unwrap();
    h.bot.inject(callback(7, "10")).await;
    h.bot.inject(callback(7, "20")).await;
    h.bot.inject(callback(7, "404")).await;

    h.release_bot().run(CancellationToken::new()).await.unwrap();

    let texts: Vec<String> = h.bot.messages().await.into_iter().map(|(_, t)| t).collect();
    assert_eq!(
        texts,
        vec![
            "API 1.4.0: unreleased, planned 2026-11-02, resolved 3/4 (75%)".to_string(),
            ACCESS_DENIED.to_string(),
            INTERNAL_ERROR.to_string(),
        ]
    );
    assert_eq!(h.bot.answered().await, vec!["cb-7-10", "cb-7-20", "cb-7-404"]);
}

#[tokio::test]
async fn bot_stops_on_cancellation() {
    let h = TestHarness::new().await.unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    h.bot.inject(command(1, "/reg")).await;

    // a cancelled token may still let one update through; the loop must exit
    h.release_bot().run(cancel).await.unwrap();
}

// --- webhooks ---

#[tokio::test]
async fn push_with_migration_posts_file_contents() {
    let h = TestHarness::new().await.unwrap();
    h.source
        .add_file("42", "db/migrations/0007_users.sql", "b2", b"CREATE TABLE users (id INTEGER);\n")
        .await;
    let event: PushEvent = serde_json::from_value(serde_json::json!({
        "event": "push",
        "ref": "refs/heads/main",
        "project": {"id": 42, "name": "api"},
        "user_name": "ann",
        "user_avatar": "",
        "commits": [
            {"id": "a1", "added": ["README.md"], "modified": []},
            {"id": "b2", "added": ["db/migrations/0007_users.sql"], "modified": []}
        ],
        "total_commits_count": 25
    }))
    .unwrap();

    assert_eq!(h.webhooks().push(&event).await.unwrap(), 1);

    let sent = h.chat.sent().await;
    assert_eq!(sent.len(), 1);
    let Sent::Message { channel, text } = &sent[0] else {
        panic!("expected a message, got {sent:?}");
    };
    assert_eq!(channel, MIGRATIONS);
    assert!(text.contains("db/migrations/0007_users.sql"));
    assert!(text.contains("CREATE TABLE users (id INTEGER);"));
}

#[tokio::test]
async fn non_push_events_are_ignored() {
    let h = TestHarness::new().await.unwrap();
    let event: PushEvent = serde_json::from_value(serde_json::json!({
        "event": "tag_push",
        "project": {"id": 42},
        "commits": [{"id": "a1", "added": ["db/migrations/0001_init.sql"]}]
    }))
    .unwrap();

    assert_eq!(h.webhooks().push(&event).await.unwrap(), 0);
    assert!(h.chat.sent().await.is_empty());
}

#[tokio::test]
async fn issue_status_change_is_announced_when_configured() {
    let h = TestHarness::new().await.unwrap();
    let done = IssueUpdatedEvent {
        issue_key: "API-9".into(),
        summary: "Export orders".into(),
        from_status: Some("In Review".into()),
        to_status: "Done".into(),
        assignee: Some("Dana".into()),
    };
    let review = IssueUpdatedEvent {
        to_status: "In Review".into(),
        ..done.clone()
    };

    assert!(h.webhooks().issue_updated(&done).await.unwrap());
    assert!(!h.webhooks().issue_updated(&review).await.unwrap());

    let sent = h.chat.sent().await;
    assert_eq!(sent.len(), 1);
    let Sent::Message { channel, text } = &sent[0] else {
        panic!("expected a message, got {sent:?}");
    };
    assert_eq!(channel, RELEASES);
    assert!(text.contains("API-9"));
    assert!(text.contains("moved to *Done* from In Review"));
}

#[tokio::test]
async fn merge_into_release_branch_is_announced() {
    let h = TestHarness::new().await.unwrap();
    let event = PullRequestMergedEvent {
        repository: "api".into(),
        pull_request_id: 12,
        title: "Fix totals".into(),
        author: "someone".into(),
        destination_branch: "release/20261102".into(),
        link: "https://src.example.com/api/pull-requests/12".into(),
    };
    let to_dev = PullRequestMergedEvent {
        destination_branch: "dev".into(),
        ..event.clone()
    };

    assert!(h.webhooks().pull_request_merged(&event).await.unwrap());
    assert!(!h.webhooks().pull_request_merged(&to_dev).await.unwrap());
    assert_eq!(
        h.chat.sent_texts().await,
        vec![
            "Merged into `release/20261102` in api: \
             <https://src.example.com/api/pull-requests/12|Fix totals> by unknown user"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn afk_beyond_a_year_is_rejected_without_storing() {
    let h = TestHarness::new().await.unwrap();
    let commands = h.commands();
    for huge in ["100000000d", "9300000000000000s", "366d"] {
        let reply = commands.handle("U1", "/afk", huge).await;
        assert!(reply.contains("invalid duration"), "{huge}: {reply}");
        assert!(reply.contains("365d"));
    }
    assert!(h.store.list_afk_timers().await.unwrap().is_empty());

    assert_eq!(commands.handle("U1", "/afk", "365d").await, "you are away for 8760h 00m");
}

#[tokio::test]
async fn afk_timer_expiry_uses_clock() {
    let h = TestHarness::new().await.unwrap();
    h.commands().handle("U1", "/afk", "30m").await;
    let timer = h.store.list_afk_timers().await.unwrap().remove(0);
    assert!(timer.is_active(h.clock.now()));
    h.clock.advance(Duration::minutes(31));
    assert!(!timer.is_active(h.clock.now()));
}
