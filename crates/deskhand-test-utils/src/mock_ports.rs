// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock issue tracker, source host, and time tracker.
//!
//! Each serves seeded data and records the writes it receives.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use deskhand_core::traits::adapter::PluginAdapter;
use deskhand_core::traits::{IssueTracker, SourceHost, TimeTracker};
use deskhand_core::types::{
    AdapterType, Branch, HealthStatus, Issue, Organization, Project, PullRequest,
    PullRequestActivity, Repository, Version, VersionIssueCount,
};
use deskhand_core::DeskhandError;

macro_rules! plugin_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
                Ok(HealthStatus::Healthy)
            }

            async fn shutdown(&self) -> Result<(), DeskhandError> {
                Ok(())
            }
        }
    };
}

// --- Issue tracker ---

#[derive(Default)]
struct IssueState {
    issues: Vec<Issue>,
    queries: Vec<String>,
    transitions: Vec<(String, String)>,
    versions: Vec<Version>,
    projects: Vec<Project>,
    counts: HashMap<String, VersionIssueCount>,
    fail_transitions: bool,
}

#[derive(Clone, Default)]
pub struct MockIssueTracker {
    state: Arc<Mutex<IssueState>>,
}

impl MockIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues returned by every search, whatever the query.
    pub async fn set_issues(&self, issues: Vec<Issue>) {
        self.state.lock().await.issues = issues;
    }

    pub async fn add_project(&self, project: Project) {
        self.state.lock().await.projects.push(project);
    }

    pub async fn add_version(&self, version: Version, count: VersionIssueCount) {
        let mut state = self.state.lock().await;
        state.counts.insert(version.id.clone(), count);
        state.versions.push(version);
    }

    pub async fn fail_transitions(&self, fail: bool) {
        self.state.lock().await.fail_transitions = fail;
    }

    pub async fn queries(&self) -> Vec<String> {
        self.state.lock().await.queries.clone()
    }

    /// `(issue key, transition)` pairs applied so far.
    pub async fn transitions(&self) -> Vec<(String, String)> {
        self.state.lock().await.transitions.clone()
    }
}

plugin_adapter!(MockIssueTracker, "mock-issue-tracker", AdapterType::IssueTracker);

#[async_trait]
impl IssueTracker for MockIssueTracker {
    async fn search_issues(
        &self,
        jql: &str,
        _fields: &[&str],
        _page_size: u32,
    ) -> Result<Vec<Issue>, DeskhandError> {
        let mut state = self.state.lock().await;
        state.queries.push(jql.to_string());
        Ok(state.issues.clone())
    }

    async fn transition_issue(&self, key: &str, transition: &str) -> Result<(), DeskhandError> {
        let mut state = self.state.lock().await;
        if state.fail_transitions {
            return Err(DeskhandError::internal("transition rejected"));
        }
        state
            .transitions
            .push((key.to_string(), transition.to_string()));
        Ok(())
    }

    async fn get_version(&self, id: &str) -> Result<Version, DeskhandError> {
        self.state
            .lock()
            .await
            .versions
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| DeskhandError::not_found(format!("version {id}")))
    }

    async fn get_project(&self, key: &str) -> Result<Project, DeskhandError> {
        self.state
            .lock()
            .await
            .projects
            .iter()
            .find(|p| p.key == key || p.id == key)
            .cloned()
            .ok_or_else(|| DeskhandError::not_found(format!("project {key}")))
    }

    async fn list_unreleased_versions(
        &self,
        project_key: &str,
    ) -> Result<Vec<Version>, DeskhandError> {
        let state = self.state.lock().await;
        let Some(project) = state.projects.iter().find(|p| p.key == project_key) else {
            return Ok(Vec::new());
        };
        Ok(state
            .versions
            .iter()
            .filter(|v| v.project_id == project.id && !v.released)
            .cloned()
            .collect())
    }

    async fn count_issues_for_version(
        &self,
        version_id: &str,
    ) -> Result<VersionIssueCount, DeskhandError> {
        Ok(self
            .state
            .lock()
            .await
            .counts
            .get(version_id)
            .copied()
            .unwrap_or_default())
    }
}

// --- Source host ---

#[derive(Default)]
struct SourceState {
    repositories: Vec<Repository>,
    pull_requests: HashMap<String, Vec<PullRequest>>,
    activity: HashMap<(String, i64), Vec<PullRequestActivity>>,
    branches: Vec<Branch>,
    files: HashMap<(String, String, String), Vec<u8>>,
    deleted_branches: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct MockSourceHost {
    state: Arc<Mutex<SourceState>>,
}

impl MockSourceHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_repository(&self, slug: &str) {
        self.state.lock().await.repositories.push(Repository {
            slug: slug.to_string(),
            name: slug.to_string(),
        });
    }

    pub async fn add_pull_request(&self, pr: PullRequest, activity: Vec<PullRequestActivity>) {
        let mut state = self.state.lock().await;
        state
            .activity
            .insert((pr.repo_slug.clone(), pr.id), activity);
        state
            .pull_requests
            .entry(pr.repo_slug.clone())
            .or_default()
            .push(pr);
    }

    pub async fn set_branches(&self, branches: Vec<Branch>) {
        self.state.lock().await.branches = branches;
    }

    pub async fn add_file(&self, project_id: &str, path: &str, git_ref: &str, bytes: &[u8]) {
        self.state.lock().await.files.insert(
            (project_id.to_string(), path.to_string(), git_ref.to_string()),
            bytes.to_vec(),
        );
    }

    /// `(repo, branch)` pairs deleted upstream so far.
    pub async fn deleted_branches(&self) -> Vec<(String, String)> {
        self.state.lock().await.deleted_branches.clone()
    }
}

plugin_adapter!(MockSourceHost, "mock-source-host", AdapterType::SourceHost);

#[async_trait]
impl SourceHost for MockSourceHost {
    async fn list_repositories(&self) -> Result<Vec<Repository>, DeskhandError> {
        Ok(self.state.lock().await.repositories.clone())
    }

    async fn list_open_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>, DeskhandError> {
        Ok(self
            .state
            .lock()
            .await
            .pull_requests
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_pull_request_activity(
        &self,
        repo: &str,
        pr_id: i64,
    ) -> Result<Vec<PullRequestActivity>, DeskhandError> {
        Ok(self
            .state
            .lock()
            .await
            .activity
            .get(&(repo.to_string(), pr_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_branches_without_pull_requests(&self) -> Result<Vec<Branch>, DeskhandError> {
        Ok(self.state.lock().await.branches.clone())
    }

    async fn get_file(
        &self,
        project_id: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<u8>, DeskhandError> {
        self.state
            .lock()
            .await
            .files
            .get(&(project_id.to_string(), path.to_string(), git_ref.to_string()))
            .cloned()
            .ok_or_else(|| DeskhandError::not_found(format!("file {path}@{git_ref}")))
    }

    async fn delete_branch(&self, repo: &str, name: &str) -> Result<(), DeskhandError> {
        let mut state = self.state.lock().await;
        state.branches.retain(|b| !(b.repo_slug == repo && b.name == name));
        state
            .deleted_branches
            .push((repo.to_string(), name.to_string()));
        Ok(())
    }
}

// --- Time tracker ---

#[derive(Default)]
struct TimeState {
    organizations: Vec<Organization>,
    requests: Vec<(NaiveDate, NaiveDate, i64)>,
}

#[derive(Clone, Default)]
pub struct MockTimeTracker {
    state: Arc<Mutex<TimeState>>,
}

impl MockTimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_organizations(&self, organizations: Vec<Organization>) {
        self.state.lock().await.organizations = organizations;
    }

    /// `(start, end, org_id)` of every report requested.
    pub async fn requests(&self) -> Vec<(NaiveDate, NaiveDate, i64)> {
        self.state.lock().await.requests.clone()
    }
}

plugin_adapter!(MockTimeTracker, "mock-time-tracker", AdapterType::TimeTracker);

#[async_trait]
impl TimeTracker for MockTimeTracker {
    async fn report_by_member_and_team(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        org_id: i64,
    ) -> Result<Vec<Organization>, DeskhandError> {
        let mut state = self.state.lock().await;
        state.requests.push((start, end, org_id));
        Ok(state
            .organizations
            .iter()
            .filter(|o| o.id == org_id)
            .cloned()
            .collect())
    }
}
