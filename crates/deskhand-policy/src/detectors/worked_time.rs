// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily summary of tracked time per team.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use deskhand_config::{UserDirectory, UserTag};
use deskhand_core::DeskhandError;
use deskhand_core::duration::format_duration;
use deskhand_core::types::MemberActivity;
use tracing::info;

use crate::context::DetectorContext;
use crate::detector::Detector;

const OTHER_TEAM: &str = "other";
const UNDER_MARK: &str = " :warning:";

/// Team a tracked member belongs to: directory first, then the tracker's
/// own team label.
fn team_of(directory: &UserDirectory, member: &MemberActivity) -> String {
    directory
        .find(UserTag::TimeTrackerId, &member.user_id.to_string())
        .and_then(|u| u.team())
        .map(|t| t.to_string())
        .or_else(|| member.team.clone())
        .unwrap_or_else(|| OTHER_TEAM.to_string())
}

fn display_of(directory: &UserDirectory, member: &MemberActivity) -> String {
    directory
        .find(UserTag::TimeTrackerId, &member.user_id.to_string())
        .map(|u| u.mention())
        .unwrap_or_else(|| member.name.clone())
}

/// Renders the report for `day`. Members under `min_seconds` are flagged.
pub fn render_report(
    directory: &UserDirectory,
    day: NaiveDate,
    members: &[MemberActivity],
    min_seconds: i64,
) -> Result<String, DeskhandError> {
    let mut teams: BTreeMap<String, Vec<&MemberActivity>> = BTreeMap::new();
    for member in members {
        teams.entry(team_of(directory, member)).or_default().push(member);
    }

    let mut text = format!("Worked time for {day}:");
    for (team, mut members) in teams {
        members.sort_by(|a, b| b.tracked_seconds.cmp(&a.tracked_seconds));
        text.push_str(&format!("\n\n*{team}*"));
        for member in members {
            text.push_str(&format!(
                "\n  {} {}",
                display_of(directory, member),
                format_duration(member.tracked_seconds)?
            ));
            if member.tracked_seconds < min_seconds {
                text.push_str(UNDER_MARK);
            }
        }
    }
    Ok(text)
}

pub struct WorkedTime;

#[async_trait]
impl Detector for WorkedTime {
    fn name(&self) -> &'static str {
        "worked_time"
    }

    async fn run(&self, ctx: &DetectorContext) -> Result<(), DeskhandError> {
        let day = ctx.clock.now().date_naive() - Duration::days(1);
        let org_id = ctx.config.hubstaff.org_id;
        let orgs = ctx.time.report_by_member_and_team(day, day, org_id).await?;

        let members: Vec<MemberActivity> = orgs.into_iter().flat_map(|o| o.members).collect();
        if members.is_empty() {
            info!(%day, "no tracked time to report");
            return Ok(());
        }
        let min_seconds = (ctx.config.reports.min_daily_hours * 3600.0) as i64;
        let text = render_report(&ctx.directory, day, &members, min_seconds)?;
        ctx.dispatcher
            .send_message(&ctx.config.slack.channels.general, &text)
            .await?;
        info!(%day, members = members.len(), "worked time report sent");
        Ok(())
    }
}
