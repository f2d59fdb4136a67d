// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Open pull requests without recent activity.
//!
//! Aging uses two clocks: the last approve/update/comment on the pull request
//! and the `first_seen_at` stored when it was first reported. Each bucket is
//! posted at most once per row.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use deskhand_core::DeskhandError;
use deskhand_core::entities::{AttentionBucket, ForgottenPullRequest, PullRequestSweep};
use deskhand_core::types::{PullRequest, PullRequestActivity};
use tracing::{debug, info};

use crate::context::DetectorContext;
use crate::detector::Detector;
use crate::detectors::Buckets;
use crate::format::{author_mention, link};

pub const FIRST_HEADER: &str = "These pull requests have had no activity for five days:";
pub const SECOND_HEADER: &str = "These pull requests are still waiting, please review or close them:";
pub const THIRD_HEADER: &str = "Last call, these pull requests have been idle for over a week:";

/// Latest approval, update, or comment; the pull request's own `updated_on`
/// when there is no activity at all.
pub fn last_activity_at(pr: &PullRequest, activity: &[PullRequestActivity]) -> DateTime<Utc> {
    activity
        .iter()
        .map(|a| a.date)
        .max()
        .unwrap_or(pr.updated_on)
}

/// Bucket for a pull request that already has a row. `None` means keep aging.
pub fn aged_bucket(
    now: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    first_seen: DateTime<Utc>,
) -> Option<AttentionBucket> {
    if last_activity < now - Duration::days(8) && first_seen < now - Duration::days(3) {
        Some(AttentionBucket::Third)
    } else if last_activity < now - Duration::days(7) && first_seen < now - Duration::days(2) {
        Some(AttentionBucket::Second)
    } else {
        None
    }
}

pub struct ForgottenPullRequests;

#[async_trait]
impl Detector for ForgottenPullRequests {
    fn name(&self) -> &'static str {
        "forgotten_pull_requests"
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
        let rows: HashMap<(String, i64), ForgottenPullRequest> = ctx
            .store
            .list_forgotten_pull_requests()
            .await?
            .into_iter()
            .map(|r| ((r.repo_slug.clone(), r.pull_request_id), r))
            .collect();

        let mut seen = HashSet::new();
        let mut buckets = Buckets::default();
        let mut sweep = PullRequestSweep::default();

        for repo in ctx.source.list_repositories().await? {
            ctx.ensure_running()?;
            for pr in ctx.source.list_open_pull_requests(&repo.slug).await? {
                if protected.contains(&pr.title) {
                    continue;
                }
                ctx.ensure_running()?;
                let activity = ctx
                    .source
                    .list_pull_request_activity(&repo.slug, pr.id)
                    .await?;
                let last_activity = last_activity_at(&pr, &activity);
                if last_activity > now - Duration::days(5) {
                    debug!(repo = %repo.slug, pr = pr.id, "pull request is fresh");
                    continue;
                }

                let key = (repo.slug.clone(), pr.id);
                seen.insert(key.clone());
                let bucket = match rows.get(&key) {
                    None => {
                        sweep.created.push(ForgottenPullRequest {
                            repo_slug: repo.slug.clone(),
                            pull_request_id: pr.id,
                            first_seen_at: now,
                            notified_bucket: Some(AttentionBucket::First),
                        });
                        AttentionBucket::First
                    }
                    Some(row) => match aged_bucket(now, last_activity, row.first_seen_at) {
                        Some(bucket) if Some(bucket) > row.notified_bucket => bucket,
                        _ => continue,
                    },
                };
                match bucket {
                    AttentionBucket::Third => sweep.deleted.push(key),
                    AttentionBucket::Second => sweep.notified.push((key, bucket)),
                    AttentionBucket::First => {}
                }
                buckets.push(
                    bucket,
                    author_mention(&ctx.directory, &pr.author),
                    link(&pr.link, &pr.title),
                );
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

        ctx.store.commit_pull_request_sweep(&sweep).await?;
        info!(
            created = sweep.created.len(),
            notified = sweep.notified.len(),
            deleted = sweep.deleted.len(),
            "forgotten pull request sweep committed"
        );
        Ok(())
    }
}
