// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Jira REST v2 payloads and their conversion into port types.

use chrono::{DateTime, NaiveDate, Utc};
use deskhand_core::types::{
    Account, FixVersion, Issue, Priority, Project, Version, VersionIssueCount, WorkLog,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Jira timestamps look like `2026-10-19T11:30:00.000+0000`.
const JIRA_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

fn parse_time(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_str(raw, JIRA_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|t| t.with_timezone(&Utc))
}

fn jira_time<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    parse_time(&raw).map_err(serde::de::Error::custom)
}

fn opt_jira_time<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(d)? {
        Some(raw) => parse_time(&raw).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub account_id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
}

impl From<JiraUser> for Account {
    fn from(user: JiraUser) -> Self {
        Account {
            account_id: user.account_id.or(user.name).unwrap_or_default(),
            display_name: user.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct JiraPriority {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct JiraFixVersion {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraWorkLog {
    pub author: Option<JiraUser>,
    #[serde(deserialize_with = "jira_time")]
    pub started: DateTime<Utc>,
    #[serde(default)]
    pub time_spent_seconds: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkLogPage {
    #[serde(default)]
    pub worklogs: Vec<JiraWorkLog>,
}

/// The `fields` object; every field is optional because searches request
/// only a subset.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    pub issuetype: Option<Named>,
    pub status: Option<Named>,
    pub priority: Option<JiraPriority>,
    pub assignee: Option<JiraUser>,
    pub duedate: Option<NaiveDate>,
    #[serde(default)]
    pub fix_versions: Vec<JiraFixVersion>,
    pub worklog: Option<WorkLogPage>,
    pub timespent: Option<i64>,
    pub timeoriginalestimate: Option<i64>,
    pub timeestimate: Option<i64>,
    #[serde(default, deserialize_with = "opt_jira_time")]
    pub resolutiondate: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub fields: IssueFields,
}

impl From<JiraIssue> for Issue {
    fn from(issue: JiraIssue) -> Self {
        let f = issue.fields;
        Issue {
            key: issue.key,
            summary: f.summary,
            issue_type: f.issuetype.map(|t| t.name).unwrap_or_default(),
            status: f.status.map(|s| s.name).unwrap_or_default(),
            priority: f.priority.and_then(|p| {
                Some(Priority {
                    id: p.id.parse().ok()?,
                    name: p.name,
                })
            }),
            assignee: f.assignee.map(Account::from),
            due_date: f.duedate,
            fix_versions: f
                .fix_versions
                .into_iter()
                .map(|v| FixVersion { id: v.id, name: v.name })
                .collect(),
            worklogs: f
                .worklog
                .unwrap_or_default()
                .worklogs
                .into_iter()
                .map(|w| WorkLog {
                    author: w.author.map(Account::from),
                    started: w.started,
                    time_spent_seconds: w.time_spent_seconds,
                })
                .collect(),
            time_spent: f.timespent.unwrap_or(0),
            original_estimate: f.timeoriginalestimate.unwrap_or(0),
            remaining_estimate: f.timeestimate.unwrap_or(0),
            resolution_date: f.resolutiondate,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

#[derive(Debug, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Transitions {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Serialize)]
pub struct TransitionRef<'a> {
    pub id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct DoTransition<'a> {
    pub transition: TransitionRef<'a>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraVersion {
    pub id: String,
    pub name: String,
    pub project_id: Option<i64>,
    #[serde(default)]
    pub released: bool,
    #[serde(default)]
    pub archived: bool,
    pub release_date: Option<NaiveDate>,
}

impl JiraVersion {
    /// Converts with the project id taken from the payload or, for
    /// per-project listings that omit it, from `fallback_project`.
    pub fn into_version(self, fallback_project: &str) -> Version {
        Version {
            id: self.id,
            name: self.name,
            project_id: self
                .project_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| fallback_project.to_string()),
            released: self.released,
            release_date: self.release_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JiraProject {
    pub id: String,
    pub key: String,
    pub name: String,
}

impl From<JiraProject> for Project {
    fn from(p: JiraProject) -> Self {
        Project {
            id: p.id,
            key: p.key,
            name: p.name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedIssueCounts {
    #[serde(default)]
    pub issues_fixed_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedIssueCount {
    #[serde(default)]
    pub issues_unresolved_count: u64,
}

pub fn issue_count(related: RelatedIssueCounts, unresolved: UnresolvedIssueCount) -> VersionIssueCount {
    VersionIssueCount {
        total: related.issues_fixed_count,
        unresolved: unresolved.issues_unresolved_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn converts_full_issue() {
        let raw = serde_json::json!({
            "key": "API-7",
            "fields": {
                "summary": "Fix login",
                "issuetype": {"name": "Bug"},
                "status": {"name": "Open"},
                "priority": {"id": "2", "name": "High"},
                "assignee": {"accountId": "acc-1", "displayName": "Ann"},
                "duedate": "2026-10-30",
                "fixVersions": [{"id": "10", "name": "1.4/20261102"}],
                "worklog": {"worklogs": [{
                    "author": {"name": "ann", "displayName": "Ann"},
                    "started": "2026-10-19T11:30:00.000+0000",
                    "timeSpentSeconds": 1800
                }]},
                "timespent": 7200,
                "timeoriginalestimate": 3600,
                "timeestimate": 0,
                "resolutiondate": "2026-10-18T09:00:00.000+0300"
            }
        });
        let issue: Issue = serde_json::from_value::<JiraIssue>(raw).unwrap().into();
        assert_eq!(issue.issue_type, "Bug");
        assert_eq!(issue.priority_id(), Some(2));
        assert_eq!(issue.assignee.as_ref().unwrap().account_id, "acc-1");
        assert_eq!(issue.worklogs[0].author.as_ref().unwrap().account_id, "ann");
        assert_eq!(
            issue.worklogs[0].started,
            Utc.with_ymd_and_hms(2026, 10, 19, 11, 30, 0).unwrap()
        );
        assert_eq!(
            issue.resolution_date,
            Some(Utc.with_ymd_and_hms(2026, 10, 18, 6, 0, 0).unwrap())
        );
        assert_eq!(
            issue.nearest_release_date(),
            NaiveDate::from_ymd_opt(2026, 11, 2)
        );
        assert_eq!(issue.time_spent, 7200);
        assert_eq!(issue.original_estimate, 3600);
    }

    #[test]
    fn sparse_fields_default() {
        let raw = serde_json::json!({"key": "API-8", "fields": {"summary": "x"}});
        let issue: Issue = serde_json::from_value::<JiraIssue>(raw).unwrap().into();
        assert!(issue.priority.is_none());
        assert!(issue.worklogs.is_empty());
        assert_eq!(issue.original_estimate, 0);
        assert!(issue.resolution_date.is_none());
    }

    #[test]
    fn version_falls_back_to_listing_project() {
        let v: JiraVersion =
            serde_json::from_value(serde_json::json!({"id": "10", "name": "1.4"})).unwrap();
        assert_eq!(v.into_version("100").project_id, "100");
        let v: JiraVersion = serde_json::from_value(
            serde_json::json!({"id": "10", "name": "1.4", "projectId": 200, "releaseDate": "2026-11-02"}),
        )
        .unwrap();
        let version = v.into_version("100");
        assert_eq!(version.project_id, "200");
        assert_eq!(version.release_date, NaiveDate::from_ymd_opt(2026, 11, 2));
    }
}
