// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Branches that never got a pull request.
//!
//! A branch is first reported when it is seen, again once it is six days old,
//! and a final time at seven days, when its row is dropped (and the branch
//! optionally deleted upstream). The row remembers the last bucket posted so
//! the six-day notice goes out once even when the job runs more often.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::Duration;
use deskhand_core::DeskhandError;
use deskhand_core::entities::{AttentionBucket, BranchSweep, ForgottenBranch};
use deskhand_core::types::Branch;
use regex::Regex;
use tracing::{info, warn};

use crate::context::DetectorContext;
use crate::detector::Detector;
use crate::detectors::Buckets;
use crate::format::{author_mention, link};

static RELEASE_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(release|hotfix)/[0-9]{8}").unwrap());

pub const FIRST_HEADER: &str = "These branches have no pull request. Open one or delete them:";
pub const SECOND_HEADER: &str =
    "Still no pull request on these branches, they will be flagged for the last time tomorrow:";
pub const THIRD_HEADER: &str = "These branches have gone a week without a pull request:";

/// Long-lived branches that are never reported.
pub fn is_ignored_branch(name: &str) -> bool {
    name == "master" || name == "dev" || RELEASE_BRANCH.is_match(name)
}

pub struct ForgottenBranches;

#[async_trait]
impl Detector for ForgottenBranches {
    fn name(&self) -> &'static str {
        "forgotten_branches"
    }

    async fn run(&self, ctx: &DetectorContext) -> Result<(), DeskhandError> {
        let now = ctx.clock.now();
        let protected: HashSet<String> = ctx
            .store
            .list_protected_names()
            .await?
            .into_iter()
            .map(|p| p.name)
            .collect();
        let rows: HashMap<(String, String), ForgottenBranch> = ctx
            .store
            .list_forgotten_branches()
            .await?
            .into_iter()
            .map(|r| ((r.repo_slug.clone(), r.branch_name.clone()), r))
            .collect();

        ctx.ensure_running()?;
        let branches = ctx.source.list_branches_without_pull_requests().await?;

        let mut seen = HashSet::new();
        let mut buckets = Buckets::default();
        let mut sweep = BranchSweep::default();
        let mut expired: Vec<Branch> = Vec::new();

        for branch in branches {
            if is_ignored_branch(&branch.name) || protected.contains(&branch.name) {
                continue;
            }
            let key = (branch.repo_slug.clone(), branch.name.clone());
            if !seen.insert(key.clone()) {
                continue;
            }

            let bucket = match rows.get(&key) {
                None => {
                    sweep.created.push(ForgottenBranch {
                        repo_slug: branch.repo_slug.clone(),
                        branch_name: branch.name.clone(),
                        first_seen_at: now,
                        notified_bucket: Some(AttentionBucket::First),
                    });
                    AttentionBucket::First
                }
                Some(row) => {
                    let age = now - row.first_seen_at;
                    if age >= Duration::days(7) {
                        sweep.deleted.push(key.clone());
                        AttentionBucket::Third
                    } else if age >= Duration::days(6)
                        && row.notified_bucket < Some(AttentionBucket::Second)
                    {
                        sweep.notified.push((key.clone(), AttentionBucket::Second));
                        AttentionBucket::Second
                    } else {
                        continue;
                    }
                }
            };

            let label = format!("{}/{}", branch.repo_slug, branch.name);
            buckets.push(
                bucket,
                author_mention(&ctx.directory, &branch.author),
                link(&branch.link, &label),
            );
            if bucket == AttentionBucket::Third {
                expired.push(branch);
            }
        }

        sweep
            .deleted
            .extend(rows.into_keys().filter(|key| !seen.contains(key)));

        let channel = &ctx.config.slack.channels.development;
        for (bucket, authors) in buckets.iter() {
            let header = match bucket {
                AttentionBucket::First => FIRST_HEADER,
                AttentionBucket::Second => SECOND_HEADER,
                AttentionBucket::Third => THIRD_HEADER,
            };
            ctx.dispatcher
                .send_message(channel, &Buckets::render(header, authors))
                .await?;
        }

        ctx.store.commit_branch_sweep(&sweep).await?;
        info!(
            created = sweep.created.len(),
            notified = sweep.notified.len(),
            deleted = sweep.deleted.len(),
            "forgotten branch sweep committed"
        );

        if ctx.config.forgotten.delete_branches {
            for branch in expired {
                ctx.ensure_running()?;
                match ctx.source.delete_branch(&branch.repo_slug, &branch.name).await {
                    Ok(()) => info!(repo = %branch.repo_slug, branch = %branch.name, "branch deleted"),
                    Err(e) => warn!(
                        repo = %branch.repo_slug,
                        branch = %branch.name,
                        error = %e,
                        "failed to delete branch"
                    ),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_lived_branches_are_ignored() {
        assert!(is_ignored_branch("master"));
        assert!(is_ignored_branch("dev"));
        assert!(is_ignored_branch("release/20260101"));
        assert!(is_ignored_branch("hotfix/20261019-auth"));
        assert!(!is_ignored_branch("release/next"));
        assert!(!is_ignored_branch("feature/dev"));
        assert!(!is_ignored_branch("develop"));
    }
}
