// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bitbucket Cloud source host adapter for Deskhand.

pub mod client;
pub mod types;

use std::collections::HashSet;

use async_trait::async_trait;
use deskhand_config::model::BitbucketConfig;
use deskhand_core::types::{
    AdapterType, Branch, HealthStatus, PullRequest, PullRequestActivity, Repository,
};
use deskhand_core::{DeskhandError, PluginAdapter, SourceHost};
use tracing::{debug, info};

use crate::client::BitbucketClient;
use crate::types::{Activity, BbBranch, BbPullRequest, BbRepository};

const PAGE_LEN: &str = "50";

/// Source host backed by the repositories of one Bitbucket workspace.
pub struct BitbucketSource {
    client: BitbucketClient,
    owner: String,
    web_url: String,
}

impl BitbucketSource {
    pub fn new(config: &BitbucketConfig) -> Result<Self, DeskhandError> {
        if config.owner.is_empty() {
            return Err(DeskhandError::internal("bitbucket.owner is not configured"));
        }
        let client = BitbucketClient::new(
            &config.base_url,
            config.username.clone(),
            config.password.clone(),
        )?;
        info!(owner = %config.owner, "bitbucket adapter initialized");
        Ok(Self {
            client,
            owner: config.owner.clone(),
            web_url: config.web_url.trim_end_matches('/').to_string(),
        })
    }

    fn repo_path(&self, repo: &str) -> String {
        format!("/repositories/{}/{repo}", self.owner)
    }

    async fn repositories(&self) -> Result<Vec<BbRepository>, DeskhandError> {
        self.client
            .get_all(&format!("/repositories/{}", self.owner), &[("pagelen", PAGE_LEN)])
            .await
    }

    async fn open_pull_requests(&self, repo: &str) -> Result<Vec<BbPullRequest>, DeskhandError> {
        self.client
            .get_all(
                &format!("{}/pullrequests", self.repo_path(repo)),
                &[("state", "OPEN"), ("pagelen", PAGE_LEN)],
            )
            .await
    }

    fn branch_link(&self, repo: &str, branch: &BbBranch) -> String {
        let link = branch.links.html();
        if link.is_empty() {
            format!("{}/{}/{repo}/branch/{}", self.web_url, self.owner, branch.name)
        } else {
            link
        }
    }
}

#[async_trait]
impl PluginAdapter for BitbucketSource {
    fn name(&self) -> &str {
        "bitbucket"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SourceHost
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskhandError> {
        debug!("bitbucket adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl SourceHost for BitbucketSource {
    async fn list_repositories(&self) -> Result<Vec<Repository>, DeskhandError> {
        Ok(self.repositories().await?.iter().map(Repository::from).collect())
    }

    async fn list_open_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>, DeskhandError> {
        Ok(self
            .open_pull_requests(repo)
            .await?
            .into_iter()
            .map(|pr| pr.into_pull_request(repo))
            .collect())
    }

    async fn list_pull_request_activity(
        &self,
        repo: &str,
        pr_id: i64,
    ) -> Result<Vec<PullRequestActivity>, DeskhandError> {
        let entries: Vec<Activity> = self
            .client
            .get_all(
                &format!("{}/pullrequests/{pr_id}/activity", self.repo_path(repo)),
                &[("pagelen", PAGE_LEN)],
            )
            .await?;
        Ok(entries.into_iter().filter_map(Activity::into_activity).collect())
    }

    async fn list_branches_without_pull_requests(&self) -> Result<Vec<Branch>, DeskhandError> {
        let mut branches = Vec::new();
        for repo in self.repositories().await? {
            let mut skip: HashSet<String> = self
                .open_pull_requests(&repo.slug)
                .await?
                .into_iter()
                .map(|pr| pr.source.branch.name)
                .collect();
            if let Some(main) = &repo.mainbranch {
                skip.insert(main.name.clone());
            }

            let listed: Vec<BbBranch> = self
                .client
                .get_all(
                    &format!("{}/refs/branches", self.repo_path(&repo.slug)),
                    &[("pagelen", PAGE_LEN)],
                )
                .await?;
            for branch in listed {
                if skip.contains(&branch.name) {
                    continue;
                }
                branches.push(Branch {
                    repo_slug: repo.slug.clone(),
                    author: branch.author(),
                    link: self.branch_link(&repo.slug, &branch),
                    name: branch.name,
                });
            }
        }
        debug!(count = branches.len(), "branches without pull requests listed");
        Ok(branches)
    }

    async fn get_file(
        &self,
        project_id: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<u8>, DeskhandError> {
        let path = path.trim_start_matches('/');
        self.client
            .get_bytes(&format!("{}/src/{git_ref}/{path}", self.repo_path(project_id)))
            .await
    }

    async fn delete_branch(&self, repo: &str, name: &str) -> Result<(), DeskhandError> {
        self.client
            .delete(&format!("{}/refs/branches/{name}", self.repo_path(repo)))
            .await?;
        info!(repo, branch = name, "branch deleted");
        Ok(())
    }
}
