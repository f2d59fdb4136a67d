// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bitbucket Cloud 2.0 payloads.

use chrono::{DateTime, Utc};
use deskhand_core::types::{ActivityKind, PullRequest, PullRequestActivity, Repository};
use serde::Deserialize;

/// A paginated listing; `next` is an absolute URL.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Href {
    pub href: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    pub html: Option<Href>,
}

impl Links {
    pub fn html(&self) -> String {
        self.html.as_ref().map(|h| h.href.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct User {
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct BranchName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BbRepository {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    pub mainbranch: Option<BranchName>,
}

impl From<&BbRepository> for Repository {
    fn from(repo: &BbRepository) -> Self {
        Repository {
            slug: repo.slug.clone(),
            name: repo.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Endpoint {
    pub branch: BranchName,
}

#[derive(Debug, Deserialize)]
pub struct BbPullRequest {
    pub id: i64,
    pub title: String,
    pub author: Option<User>,
    #[serde(default)]
    pub links: Links,
    pub updated_on: DateTime<Utc>,
    pub source: Endpoint,
    pub destination: Endpoint,
}

impl BbPullRequest {
    pub fn into_pull_request(self, repo_slug: &str) -> PullRequest {
        PullRequest {
            id: self.id,
            repo_slug: repo_slug.to_string(),
            title: self.title,
            author: self.author.map(|a| a.display_name).unwrap_or_default(),
            link: self.links.html(),
            updated_on: self.updated_on,
            source_branch: self.source.branch.name,
            destination_branch: self.destination.branch.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Approval {
    pub date: DateTime<Utc>,
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub date: DateTime<Utc>,
    pub author: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct Comment {
    pub created_on: DateTime<Utc>,
    pub user: Option<User>,
}

/// One entry of the pull request activity log; exactly one field is set.
#[derive(Debug, Deserialize)]
pub struct Activity {
    pub approval: Option<Approval>,
    pub update: Option<Update>,
    pub comment: Option<Comment>,
}

impl Activity {
    pub fn into_activity(self) -> Option<PullRequestActivity> {
        if let Some(a) = self.approval {
            return Some(PullRequestActivity {
                kind: ActivityKind::Approval,
                author: a.user.map(|u| u.display_name),
                date: a.date,
            });
        }
        if let Some(u) = self.update {
            return Some(PullRequestActivity {
                kind: ActivityKind::Update,
                author: u.author.map(|u| u.display_name),
                date: u.date,
            });
        }
        self.comment.map(|c| PullRequestActivity {
            kind: ActivityKind::Comment,
            author: c.user.map(|u| u.display_name),
            date: c.created_on,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub raw: String,
    pub user: Option<User>,
}

impl CommitAuthor {
    /// Linked account name, else the name part of `Name <email>`.
    pub fn name(&self) -> String {
        match &self.user {
            Some(user) if !user.display_name.is_empty() => user.display_name.clone(),
            _ => self
                .raw
                .split('<')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Commit {
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct BbBranch {
    pub name: String,
    pub target: Option<Commit>,
    #[serde(default)]
    pub links: Links,
}

impl BbBranch {
    pub fn author(&self) -> String {
        self.target
            .as_ref()
            .and_then(|t| t.author.as_ref())
            .map(CommitAuthor::name)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn activity_kinds() {
        let entries: Vec<Activity> = serde_json::from_value(json!([
            {"approval": {"date": "2026-10-10T10:00:00+00:00", "user": {"display_name": "Bo"}}},
            {"update": {"date": "2026-10-11T10:00:00+00:00", "author": {"display_name": "Ann"}}},
            {"comment": {"created_on": "2026-10-12T10:00:00+00:00", "user": {"display_name": "Cy"}}},
            {"pull_request": {"id": 1}}
        ]))
        .unwrap();
        let kinds: Vec<_> = entries
            .into_iter()
            .filter_map(Activity::into_activity)
            .map(|a| (a.kind, a.author))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ActivityKind::Approval, Some("Bo".to_string())),
                (ActivityKind::Update, Some("Ann".to_string())),
                (ActivityKind::Comment, Some("Cy".to_string())),
            ]
        );
    }

    #[test]
    fn branch_author_falls_back_to_raw_name() {
        let branch: BbBranch = serde_json::from_value(json!({
            "name": "feature/x",
            "target": {"author": {"raw": "Ann Lee <ann@example.com>"}}
        }))
        .unwrap();
        assert_eq!(branch.author(), "Ann Lee");

        let branch: BbBranch = serde_json::from_value(json!({
            "name": "feature/y",
            "target": {"author": {"raw": "ann <ann@example.com>", "user": {"display_name": "Ann Lee"}}}
        }))
        .unwrap();
        assert_eq!(branch.author(), "Ann Lee");
    }
}
