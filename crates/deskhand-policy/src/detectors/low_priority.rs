// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Developers logging work on something other than their top issue.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use deskhand_config::UserTag;
use deskhand_core::DeskhandError;
use deskhand_core::types::Issue;
use tracing::{debug, info, warn};

use crate::context::DetectorContext;
use crate::detector::Detector;
use crate::format::{issue_link, mention};

const JQL: &str = "assignee is not EMPTY AND resolution = Unresolved ORDER BY assignee";
const FIELDS: &[&str] = &[
    "summary",
    "issuetype",
    "status",
    "priority",
    "assignee",
    "duedate",
    "fixVersions",
    "worklog",
];

/// `None` sorts after every date.
fn cmp_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Smallest priority id, then earliest due date, then earliest release.
pub fn priority_issue(issues: &[Issue]) -> Option<&Issue> {
    issues.iter().min_by(|a, b| {
        a.priority_id()
            .unwrap_or(i64::MAX)
            .cmp(&b.priority_id().unwrap_or(i64::MAX))
            .then_with(|| cmp_dates(a.due_date, b.due_date))
            .then_with(|| cmp_dates(a.nearest_release_date(), b.nearest_release_date()))
    })
}

/// The issue with the most recent work-log, if that log started within the
/// last hour.
pub fn active_issue(issues: &[Issue], now: DateTime<Utc>) -> Option<&Issue> {
    let since = now - Duration::hours(1);
    issues
        .iter()
        .filter_map(|i| i.latest_worklog().map(|w| (i, w.started)))
        .filter(|(_, started)| *started >= since && *started <= now)
        .max_by_key(|(_, started)| *started)
        .map(|(issue, _)| issue)
}

/// Whether working on `active` instead of `priority` is fine.
pub fn is_acceptable(active: &Issue, priority: &Issue) -> bool {
    if active.key == priority.key {
        return true;
    }
    if active.priority_id() != priority.priority_id() {
        return false;
    }
    cmp_dates(active.due_date, priority.due_date) != Ordering::Greater
        && cmp_dates(active.nearest_release_date(), priority.nearest_release_date())
            != Ordering::Greater
}

pub struct LowPriorityIssuesStarted;

impl LowPriorityIssuesStarted {
    fn render(
        &self,
        ctx: &DetectorContext,
        account_id: &str,
        display_name: &str,
        active: &Issue,
        priority: &Issue,
    ) -> String {
        let directory = &ctx.directory;
        let user = directory.find(UserTag::TrackerAccountId, account_id);
        let developer = user
            .map(|u| u.mention())
            .unwrap_or_else(|| display_name.to_string());

        let mut cc = Vec::new();
        if let Some(pm) = directory.project_manager() {
            cc.push(mention(pm));
        }
        if let Some(tl) = user
            .and_then(|u| u.team())
            .and_then(|team| directory.team_leader(team))
        {
            cc.push(mention(tl));
        }

        let base = &ctx.config.jira.base_url;
        let mut text = format!(
            "{developer} started on {} ahead of {}",
            issue_link(base, &active.key),
            issue_link(base, &priority.key)
        );
        if !cc.is_empty() {
            text.push_str(", fyi ");
            text.push_str(&cc.join(" "));
        }
        text
    }
}

#[async_trait]
impl Detector for LowPriorityIssuesStarted {
    fn name(&self) -> &'static str {
        "low_priority"
    }

    async fn run(&self, ctx: &DetectorContext) -> Result<(), DeskhandError> {
        let now = ctx.clock.now();
        let jira = &ctx.config.jira;
        let issues = ctx.issues.search_issues(JQL, FIELDS, jira.page_size).await?;

        let mut by_assignee: BTreeMap<String, (String, Vec<Issue>)> = BTreeMap::new();
        for issue in issues {
            let Some(assignee) = issue.assignee.clone() else {
                continue;
            };
            by_assignee
                .entry(assignee.account_id)
                .or_insert_with(|| (assignee.display_name, Vec::new()))
                .1
                .push(issue);
        }

        let mut outbox = Vec::new();
        for (account_id, (display_name, issues)) in &by_assignee {
            if ctx
                .directory
                .is_ignored(&ctx.config.ignore, UserTag::TrackerAccountId, account_id)
            {
                debug!(account = %account_id, "assignee is ignored");
                continue;
            }
            let (Some(active), Some(priority)) = (active_issue(issues, now), priority_issue(issues))
            else {
                continue;
            };

            if active.status == jira.open_status && !active.worklogs.is_empty() {
                ctx.ensure_running()?;
                match ctx
                    .issues
                    .transition_issue(&active.key, &jira.start_transition)
                    .await
                {
                    Ok(()) => info!(issue = %active.key, "moved to in progress"),
                    Err(e) => warn!(issue = %active.key, error = %e, "transition failed"),
                }
            }

            if is_acceptable(active, priority) {
                continue;
            }
            outbox.push(self.render(ctx, account_id, display_name, active, priority));
        }

        for text in &outbox {
            ctx.dispatcher
                .send_message(&ctx.config.slack.channels.general, text)
                .await?;
        }
        info!(developers = by_assignee.len(), notices = outbox.len(), "low priority scan finished");
        Ok(())
    }
}
