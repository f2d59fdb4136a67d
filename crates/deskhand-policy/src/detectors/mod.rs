// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scheduled detectors and reports.

mod buckets;
pub mod forgotten_branches;
pub mod forgotten_prs;
pub mod low_priority;
pub mod mentions;
pub mod worked_time;
pub mod works_ratio;

pub use buckets::Buckets;
pub use forgotten_branches::ForgottenBranches;
pub use forgotten_prs::ForgottenPullRequests;
pub use low_priority::LowPriorityIssuesStarted;
pub use mentions::MentionReply;
pub use worked_time::WorkedTime;
pub use works_ratio::WorksRatio;
