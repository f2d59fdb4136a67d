// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time tracking port (Hubstaff-like).

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::DeskhandError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Organization;

#[async_trait]
pub trait TimeTracker: PluginAdapter {
    /// Tracked time per member between `start` and `end` (inclusive dates).
    async fn report_by_member_and_team(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        org_id: i64,
    ) -> Result<Vec<Organization>, DeskhandError>;
}
