// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Jira issue tracker adapter for Deskhand.
//!
//! Implements [`IssueTracker`] over Jira REST v2: paged JQL search,
//! workflow transitions by name, and the version/project reads used by
//! the release browser.

pub mod client;
pub mod types;

use async_trait::async_trait;
use deskhand_config::model::JiraConfig;
use deskhand_core::types::{AdapterType, HealthStatus, Issue, Project, Version, VersionIssueCount};
use deskhand_core::{DeskhandError, IssueTracker, PluginAdapter};
use tracing::{debug, info};

use crate::client::JiraClient;
use crate::types::{
    DoTransition, JiraProject, JiraVersion, RelatedIssueCounts, SearchPage, TransitionRef,
    Transitions, UnresolvedIssueCount, issue_count,
};

/// Issue tracker backed by Jira.
pub struct JiraTracker {
    client: JiraClient,
}

impl JiraTracker {
    pub fn new(config: &JiraConfig) -> Result<Self, DeskhandError> {
        if config.base_url.is_empty() {
            return Err(DeskhandError::internal("jira.base_url is not configured"));
        }
        let client = JiraClient::new(
            &config.base_url,
            config.username.clone(),
            config.password.clone(),
        )?;
        info!(base_url = %config.base_url, "jira adapter initialized");
        Ok(Self { client })
    }
}

#[async_trait]
impl PluginAdapter for JiraTracker {
    fn name(&self) -> &str {
        "jira"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::IssueTracker
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
        match self.client.get::<serde_json::Value>("/myself", &[]).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), DeskhandError> {
        debug!("jira adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for JiraTracker {
    async fn search_issues(
        &self,
        jql: &str,
        fields: &[&str],
        page_size: u32,
    ) -> Result<Vec<Issue>, DeskhandError> {
        let page_size = page_size.max(1);
        let mut issues = Vec::new();
        let mut start_at = 0u32;
        loop {
            let query = [
                ("jql", jql.to_string()),
                ("fields", fields.join(",")),
                ("startAt", start_at.to_string()),
                ("maxResults", page_size.to_string()),
            ];
            let page: SearchPage = self.client.get("/search", &query).await?;
            let received = page.issues.len() as u32;
            issues.extend(page.issues.into_iter().map(Issue::from));
            start_at = page.start_at + received;
            if received == 0 || start_at >= page.total {
                break;
            }
        }
        debug!(jql, count = issues.len(), "jira search finished");
        Ok(issues)
    }

    async fn transition_issue(&self, key: &str, transition: &str) -> Result<(), DeskhandError> {
        let path = format!("/issue/{key}/transitions");
        let available: Transitions = self.client.get(&path, &[]).await?;
        let target = available
            .transitions
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(transition))
            .ok_or_else(|| {
                DeskhandError::not_found(format!("transition `{transition}` for {key}"))
            })?;
        let body = DoTransition {
            transition: TransitionRef { id: &target.id },
        };
        self.client.post(&path, &body).await?;
        info!(key, transition, "issue transitioned");
        Ok(())
    }

    async fn get_version(&self, id: &str) -> Result<Version, DeskhandError> {
        let version: JiraVersion = self.client.get(&format!("/version/{id}"), &[]).await?;
        Ok(version.into_version(""))
    }

    async fn get_project(&self, key: &str) -> Result<Project, DeskhandError> {
        let project: JiraProject = self.client.get(&format!("/project/{key}"), &[]).await?;
        Ok(project.into())
    }

    async fn list_unreleased_versions(
        &self,
        project_key: &str,
    ) -> Result<Vec<Version>, DeskhandError> {
        let project = self.get_project(project_key).await?;
        let versions: Vec<JiraVersion> = self
            .client
            .get(&format!("/project/{project_key}/versions"), &[])
            .await?;
        Ok(versions
            .into_iter()
            .filter(|v| !v.released && !v.archived)
            .map(|v| v.into_version(&project.id))
            .collect())
    }

    async fn count_issues_for_version(
        &self,
        version_id: &str,
    ) -> Result<VersionIssueCount, DeskhandError> {
        let related: RelatedIssueCounts = self
            .client
            .get(&format!("/version/{version_id}/relatedIssueCounts"), &[])
            .await?;
        let unresolved: UnresolvedIssueCount = self
            .client
            .get(&format!("/version/{version_id}/unresolvedIssueCount"), &[])
            .await?;
        Ok(issue_count(related, unresolved))
    }
}
