// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron-driven task manager with single-flight job slots.
//!
//! Jobs are registered with a cron expression, run as spawned tokio tasks,
//! and observe shutdown through the [`CancellationToken`] in their
//! [`JobContext`].
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod error;
pub mod job;
pub mod manager;
pub mod schedule;

pub use error::CronError;
pub use job::{FnJob, Job, JobContext, job_fn};
pub use manager::{JobStats, TaskManager};
pub use schedule::Schedule;
