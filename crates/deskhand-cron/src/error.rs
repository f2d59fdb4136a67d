// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Errors returned by the task manager's registration and control calls.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CronError {
    #[error("job `{0}` is already scheduled")]
    DuplicateJob(String),

    #[error("invalid schedule `{expr}` for job `{name}`: {reason}")]
    InvalidSchedule {
        name: String,
        expr: String,
        reason: String,
    },

    #[error("no job named `{0}`")]
    UnknownJob(String),

    #[error("task manager is stopped")]
    Stopped,
}
