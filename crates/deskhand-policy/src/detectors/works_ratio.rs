// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weekly overrun report on recently resolved issues, sent as an xlsx
//! workbook.

use async_trait::async_trait;
use deskhand_config::UserTag;
use deskhand_core::DeskhandError;
use deskhand_core::duration::as_hours;
use deskhand_core::types::Issue;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::info;

use crate::context::DetectorContext;
use crate::detector::Detector;
use crate::format::issue_url;

const FIELDS: &[&str] = &[
    "summary",
    "issuetype",
    "assignee",
    "resolutiondate",
    "timespent",
    "timeoriginalestimate",
    "timeestimate",
];

pub const EMPTY_REPORT: &str = "No issues went over estimate this period.";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Header row of the report sheet.
pub const HEADERS: [&str; 8] = [
    "Developer",
    "Resolved",
    "Issue",
    "Type",
    "Estimate (h)",
    "Spent (h)",
    "Diff (h)",
    "Diff (%)",
];

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrunRow {
    pub developer: String,
    pub resolved: String,
    pub issue: String,
    pub issue_type: String,
    pub estimate_hours: f64,
    pub spent_hours: f64,
    pub diff_hours: f64,
    pub diff_percent: f64,
}

/// JQL for issues of `types` resolved in the last `days` days.
pub fn build_jql(types: &[String], days: i64) -> String {
    let quoted: Vec<String> = types.iter().map(|t| format!("\"{t}\"")).collect();
    format!(
        "issuetype in ({}) AND resolved >= -{days}d ORDER BY resolved",
        quoted.join(", ")
    )
}

/// Overrun percentage, or `None` when the issue is not reportable.
pub fn overrun_percent(issue: &Issue) -> Option<f64> {
    let estimate = issue.original_estimate;
    if estimate == 0 || issue.remaining_estimate != 0 || estimate < 100 {
        return None;
    }
    let over = issue.time_spent - estimate;
    if over < (estimate / 10).max(3600) {
        return None;
    }
    Some(over as f64 / (estimate as f64 / 100.0))
}

/// Reportable issues of the allowed types, sorted by overrun ascending.
pub fn collect_rows(
    issues: &[Issue],
    allowed: &[String],
    base_url: &str,
    developer: impl Fn(&Issue) -> String,
) -> Vec<OverrunRow> {
    let mut scored: Vec<(f64, &Issue)> = issues
        .iter()
        .filter(|i| allowed.contains(&i.issue_type))
        .filter_map(|i| overrun_percent(i).map(|p| (p, i)))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    scored
        .into_iter()
        .map(|(percent, issue)| OverrunRow {
            developer: developer(issue),
            resolved: issue
                .resolution_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            issue: issue_url(base_url, &issue.key),
            issue_type: issue.issue_type.clone(),
            estimate_hours: as_hours(issue.original_estimate),
            spent_hours: as_hours(issue.time_spent),
            diff_hours: as_hours(issue.time_spent - issue.original_estimate),
            diff_percent: (percent * 100.0).round() / 100.0,
        })
        .collect()
}

/// Renders `rows` as a single-sheet workbook under a bold header row.
pub fn render_xlsx(rows: &[OverrunRow]) -> Result<Vec<u8>, DeskhandError> {
    write_workbook(rows)
        .map_err(|e| DeskhandError::with_source("failed to build works ratio workbook", e))
}

fn write_workbook(rows: &[OverrunRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Works ratio")?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &row.developer)?;
        sheet.write_string(r, 1, &row.resolved)?;
        sheet.write_string(r, 2, &row.issue)?;
        sheet.write_string(r, 3, &row.issue_type)?;
        sheet.write_number(r, 4, row.estimate_hours)?;
        sheet.write_number(r, 5, row.spent_hours)?;
        sheet.write_number(r, 6, row.diff_hours)?;
        sheet.write_number(r, 7, row.diff_percent)?;
    }
    workbook.save_to_buffer()
}

/// Rows for the issues resolved in the configured window, with developers
/// named as they are in chat.
pub async fn report_rows(ctx: &DetectorContext) -> Result<Vec<OverrunRow>, DeskhandError> {
    let jira = &ctx.config.jira;
    let days = ctx.config.reports.works_ratio_days;
    let jql = build_jql(&jira.works_ratio_issue_types, days);
    let issues = ctx.issues.search_issues(&jql, FIELDS, jira.page_size).await?;

    let rows = collect_rows(&issues, &jira.works_ratio_issue_types, &jira.base_url, |issue| {
        let Some(assignee) = &issue.assignee else {
            return String::new();
        };
        ctx.directory
            .lookup(UserTag::TrackerAccountId, &assignee.account_id, UserTag::ChatName)
            .unwrap_or(&assignee.display_name)
            .to_string()
    });
    info!(issues = issues.len(), rows = rows.len(), "works ratio rows collected");
    Ok(rows)
}

pub struct WorksRatio;

#[async_trait]
impl Detector for WorksRatio {
    fn name(&self) -> &'static str {
        "works_ratio"
    }

    async fn run(&self, ctx: &DetectorContext) -> Result<(), DeskhandError> {
        let rows = report_rows(ctx).await?;
        let channel = &ctx.config.slack.channels.reports;
        if rows.is_empty() {
            ctx.dispatcher.send_message(channel, EMPTY_REPORT).await?;
        } else {
            let filename = format!("works-ratio-{}.xlsx", ctx.clock.now().format("%Y-%m-%d"));
            ctx.dispatcher
                .send_file(channel, render_xlsx(&rows)?, XLSX_CONTENT_TYPE, &filename)
                .await?;
        }
        info!(rows = rows.len(), "works ratio report sent");
        Ok(())
    }
}
