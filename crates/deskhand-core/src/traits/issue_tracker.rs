// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Issue tracker port (Jira-like).

use async_trait::async_trait;

use crate::error::DeskhandError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Issue, Project, Version, VersionIssueCount};

#[async_trait]
pub trait IssueTracker: PluginAdapter {
    /// Runs a query and returns every matching issue, paging internally.
    async fn search_issues(
        &self,
        jql: &str,
        fields: &[&str],
        page_size: u32,
    ) -> Result<Vec<Issue>, DeskhandError>;

    /// Applies the workflow transition with the given name.
    async fn transition_issue(&self, key: &str, transition: &str) -> Result<(), DeskhandError>;

    async fn get_version(&self, id: &str) -> Result<Version, DeskhandError>;

    /// Looks a project up by key or numeric id.
    async fn get_project(&self, key: &str) -> Result<Project, DeskhandError>;

    async fn list_unreleased_versions(&self, project_key: &str)
    -> Result<Vec<Version>, DeskhandError>;

    async fn count_issues_for_version(
        &self,
        version_id: &str,
    ) -> Result<VersionIssueCount, DeskhandError>;
}
