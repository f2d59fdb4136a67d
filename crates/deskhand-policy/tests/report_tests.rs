// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the issue-tracker and time-tracker detectors.

use chrono::{Duration, NaiveDate};
use deskhand_core::Clock;
use deskhand_core::types::{Account, Issue, MemberActivity, Organization, Priority, WorkLog};
use deskhand_policy::Detector;
use deskhand_policy::detectors::{LowPriorityIssuesStarted, WorkedTime, WorksRatio, works_ratio};
use deskhand_test_utils::harness::{GENERAL, REPORTS, TRACKER_URL};
use deskhand_test_utils::{Sent, TestHarness, user};

async fn harness() -> TestHarness {
    TestHarness::builder()
        .configure(|c| {
            let mut dev = user("U-D", "Dana Cole");
            dev.tracker_account_id = Some("acc-d".into());
            dev.time_tracker_id = Some("11".into());
            c.users.push(dev);
            c.users.push(user("U-TL", "Tom Lead"));
            c.users.push(user("U-PM", "Pam Manager"));
            c.teams.backend = vec!["U-D".into()];
            c.teams.backend_leader = Some("U-TL".into());
            c.teams.project_manager = Some("U-PM".into());
        })
        .build()
        .await
        .unwrap()
}

fn issue(h: &TestHarness, key: &str, priority: i64, status: &str) -> Issue {
    Issue {
        key: key.into(),
        summary: format!("{key} summary"),
        issue_type: "Task".into(),
        status: status.into(),
        priority: Some(Priority {
            id: priority,
            name: format!("P{priority}"),
        }),
        assignee: Some(Account {
            account_id: "acc-d".into(),
            display_name: "Dana Cole".into(),
        }),
        due_date: None,
        fix_versions: Vec::new(),
        worklogs: Vec::new(),
        time_spent: 0,
        original_estimate: 0,
        remaining_estimate: 0,
        resolution_date: Some(h.clock.now() - Duration::days(1)),
    }
}

fn worklog(h: &TestHarness, minutes_ago: i64) -> WorkLog {
    WorkLog {
        author: None,
        started: h.clock.now() - Duration::minutes(minutes_ago),
        time_spent_seconds: 600,
    }
}

/// Work logged on a P3 while a P1 waits is called out to the PM and lead.
#[tokio::test]
async fn starting_lower_priority_issue_is_reported() {
    let h = harness().await;
    let mut p1 = issue(&h, "P1", 1, "In Progress");
    p1.worklogs.push(worklog(&h, 3 * 60));
    let mut p3 = issue(&h, "P3", 3, "Open");
    p3.worklogs.push(worklog(&h, 10));
    h.issues.set_issues(vec![p1, p3]).await;

    LowPriorityIssuesStarted.run(&h.ctx).await.unwrap();

    assert_eq!(
        h.chat.sent().await,
        vec![Sent::Message {
            channel: GENERAL.into(),
            text: format!(
                "<@U-D> started on <{TRACKER_URL}/browse/P3|P3> ahead of \
                 <{TRACKER_URL}/browse/P1|P1>, fyi <@U-PM> <@U-TL>"
            ),
        }]
    );
    assert_eq!(
        h.issues.transitions().await,
        vec![("P3".to_string(), "Start Progress".to_string())]
    );
}

#[tokio::test]
async fn working_on_top_issue_is_quiet() {
    let h = harness().await;
    let mut p1 = issue(&h, "P1", 1, "In Progress");
    p1.worklogs.push(worklog(&h, 5));
    h.issues
        .set_issues(vec![p1, issue(&h, "P3", 3, "Open")])
        .await;

    LowPriorityIssuesStarted.run(&h.ctx).await.unwrap();

    assert!(h.chat.sent().await.is_empty());
    assert!(h.issues.transitions().await.is_empty());
}

#[tokio::test]
async fn ignored_developer_is_skipped() {
    let h = TestHarness::builder()
        .configure(|c| {
            let mut dev = user("U-D", "Dana Cole");
            dev.tracker_account_id = Some("acc-d".into());
            c.users.push(dev);
            c.ignore = vec!["U-D".into()];
        })
        .build()
        .await
        .unwrap();
    let mut p3 = issue(&h, "P3", 3, "Open");
    p3.worklogs.push(worklog(&h, 10));
    h.issues
        .set_issues(vec![issue(&h, "P1", 1, "Open"), p3])
        .await;

    LowPriorityIssuesStarted.run(&h.ctx).await.unwrap();
    assert!(h.chat.sent().await.is_empty());
}

#[tokio::test]
async fn failed_transition_does_not_stop_the_notice() {
    let h = harness().await;
    h.issues.fail_transitions(true).await;
    let mut p3 = issue(&h, "P3", 3, "Open");
    p3.worklogs.push(worklog(&h, 10));
    h.issues
        .set_issues(vec![issue(&h, "P1", 1, "Open"), p3])
        .await;

    LowPriorityIssuesStarted.run(&h.ctx).await.unwrap();
    assert_eq!(h.chat.sent().await.len(), 1);
}

// --- works ratio ---

fn finished(h: &TestHarness, key: &str, estimate: i64, spent: i64) -> Issue {
    Issue {
        original_estimate: estimate,
        time_spent: spent,
        ..issue(h, key, 2, "Done")
    }
}

#[tokio::test]
async fn works_ratio_sends_workbook_of_overruns() {
    let h = harness().await;
    h.issues
        .set_issues(vec![
            finished(&h, "API-1", 3_600, 14_400),
            finished(&h, "API-2", 0, 14_400),
            finished(&h, "API-3", 36_000, 36_500),
        ])
        .await;

    WorksRatio.run(&h.ctx).await.unwrap();

    let sent = h.chat.sent().await;
    assert_eq!(sent.len(), 1);
    let Sent::File {
        channel,
        filename,
        content_type,
        bytes,
    } = &sent[0]
    else {
        panic!("expected a file, got {sent:?}");
    };
    assert_eq!(channel, REPORTS);
    assert_eq!(content_type, works_ratio::XLSX_CONTENT_TYPE);
    assert_eq!(filename, "works-ratio-2026-10-19.xlsx");
    assert!(bytes.starts_with(b"PK\x03\x04"));

    let queries = h.issues.queries().await;
    assert!(queries[0].contains("resolved >= -7d"));
}

#[tokio::test]
async fn works_ratio_rows_name_developers_from_chat() {
    let h = harness().await;
    h.issues
        .set_issues(vec![
            finished(&h, "API-1", 3_600, 14_400),
            finished(&h, "API-2", 0, 14_400),
            finished(&h, "API-3", 36_000, 36_500),
        ])
        .await;

    let rows = works_ratio::report_rows(&h.ctx).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].developer, "Dana Cole");
    assert!(rows[0].issue.ends_with("/browse/API-1"));
    assert_eq!(rows[0].diff_hours, 3.0);
}

#[tokio::test]
async fn works_ratio_without_overruns_sends_text() {
    let h = harness().await;
    h.issues
        .set_issues(vec![finished(&h, "API-2", 0, 14_400)])
        .await;

    WorksRatio.run(&h.ctx).await.unwrap();

    assert_eq!(
        h.chat.sent().await,
        vec![Sent::Message {
            channel: REPORTS.into(),
            text: works_ratio::EMPTY_REPORT.into(),
        }]
    );
}

// --- worked time ---

#[tokio::test]
async fn worked_time_reports_previous_day_by_team() {
    let h = harness().await;
    h.time
        .set_organizations(vec![Organization {
            id: 1,
            name: "Acme".into(),
            members: vec![
                MemberActivity {
                    user_id: 11,
                    name: "Dana Cole".into(),
                    team: None,
                    tracked_seconds: 7 * 3600 + 15 * 60,
                },
                MemberActivity {
                    user_id: 12,
                    name: "Eve Stone".into(),
                    team: Some("design".into()),
                    tracked_seconds: 3 * 3600,
                },
            ],
        }])
        .await;

    WorkedTime.run(&h.ctx).await.unwrap();

    let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    assert_eq!(h.time.requests().await, vec![(day, day, 1)]);
    assert_eq!(
        h.chat.sent_texts().await,
        vec![
            "Worked time for 2026-10-18:\n\n*backend*\n  <@U-D> 7h 15m\n\n*design*\n  Eve Stone 3h 00m :warning:"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn worked_time_without_members_is_quiet() {
    let h = harness().await;
    WorkedTime.run(&h.ctx).await.unwrap();
    assert!(h.chat.sent().await.is_empty());
}
