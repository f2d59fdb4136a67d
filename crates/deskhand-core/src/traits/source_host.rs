// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source hosting port (Bitbucket-like).

use async_trait::async_trait;

use crate::error::DeskhandError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Branch, PullRequest, PullRequestActivity, Repository};

#[async_trait]
pub trait SourceHost: PluginAdapter {
    async fn list_repositories(&self) -> Result<Vec<Repository>, DeskhandError>;

    async fn list_open_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>, DeskhandError>;

    async fn list_pull_request_activity(
        &self,
        repo: &str,
        pr_id: i64,
    ) -> Result<Vec<PullRequestActivity>, DeskhandError>;

    /// Branches across all repositories that are not the source of an open pull request.
    async fn list_branches_without_pull_requests(&self) -> Result<Vec<Branch>, DeskhandError>;

    /// Raw file contents at `git_ref`.
    async fn get_file(
        &self,
        project_id: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<u8>, DeskhandError>;

    async fn delete_branch(&self, repo: &str, name: &str) -> Result<(), DeskhandError>;
}
