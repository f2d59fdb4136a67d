// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The detector contract and its bridge into the task manager.
//!
//! A run loads the prior snapshot, fetches live data, computes the diff,
//! dispatches chat messages, and only then applies store mutations. A failed
//! dispatch aborts the run with the store untouched.

use std::sync::Arc;

use async_trait::async_trait;
use deskhand_core::DeskhandError;
use deskhand_cron::{CronError, Job, JobContext, TaskManager};
use tracing::info;

use crate::context::DetectorContext;
use crate::detectors::{
    ForgottenBranches, ForgottenPullRequests, LowPriorityIssuesStarted, MentionReply, WorkedTime,
    WorksRatio,
};

#[async_trait]
pub trait Detector: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &DetectorContext) -> Result<(), DeskhandError>;
}

/// Runs a detector as a scheduled job.
pub struct DetectorJob {
    detector: Arc<dyn Detector>,
    ctx: DetectorContext,
}

impl DetectorJob {
    pub fn new(detector: Arc<dyn Detector>, ctx: DetectorContext) -> Self {
        Self { detector, ctx }
    }
}

#[async_trait]
impl Job for DetectorJob {
    async fn run(&self, job: &JobContext) -> Result<(), DeskhandError> {
        let ctx = self.ctx.with_cancel(job.cancel.clone());
        self.detector.run(&ctx).await
    }
}

/// Every detector paired with its configured schedule.
pub fn all_detectors(ctx: &DetectorContext) -> Vec<(Arc<dyn Detector>, String)> {
    let schedule = &ctx.config.schedule;
    vec![
        (
            Arc::new(ForgottenBranches) as Arc<dyn Detector>,
            schedule.forgotten_branches.clone(),
        ),
        (
            Arc::new(ForgottenPullRequests),
            schedule.forgotten_pull_requests.clone(),
        ),
        (Arc::new(MentionReply), schedule.mention_reply.clone()),
        (
            Arc::new(LowPriorityIssuesStarted),
            schedule.low_priority.clone(),
        ),
        (Arc::new(WorksRatio), schedule.works_ratio.clone()),
        (Arc::new(WorkedTime), schedule.worked_time.clone()),
    ]
}

/// Register every detector with the task manager.
pub fn register_detectors(manager: &TaskManager, ctx: &DetectorContext) -> Result<(), CronError> {
    for (detector, spec) in all_detectors(ctx) {
        let name = detector.name();
        manager.schedule(name, &spec, Arc::new(DetectorJob::new(detector, ctx.clone())))?;
    }
    info!(count = manager.job_names().len(), "detectors registered");
    Ok(())
}
