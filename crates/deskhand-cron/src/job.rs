// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unit of scheduled work.

use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deskhand_core::DeskhandError;
use tokio_util::sync::CancellationToken;

/// Passed to every job invocation.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job: String,
    pub fired_at: DateTime<Utc>,
    /// Cancelled when the task manager stops; long-running jobs should watch it.
    pub cancel: CancellationToken,
}

/// Work the task manager can run on a schedule.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    async fn run(&self, ctx: &JobContext) -> Result<(), DeskhandError>;
}

/// Adapts an async closure into a [`Job`].
pub struct FnJob<F>(F);

/// Wrap `f` so it can be scheduled.
pub fn job_fn<F, Fut>(f: F) -> FnJob<F>
where
    F: Fn(JobContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DeskhandError>> + Send + 'static,
{
    FnJob(f)
}

#[async_trait]
impl<F, Fut> Job for FnJob<F>
where
    F: Fn(JobContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DeskhandError>> + Send + 'static,
{
    async fn run(&self, ctx: &JobContext) -> Result<(), DeskhandError> {
        (self.0)(ctx.clone()).await
    }
}
