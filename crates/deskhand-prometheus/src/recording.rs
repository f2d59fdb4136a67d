// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions and recording helpers for the inbound surfaces.
//!
//! Job and notification counters are emitted where they happen (task
//! manager, dispatcher); this module describes them once for the exporter.

use metrics::{describe_counter, describe_histogram};

/// Register all Deskhand metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("deskhand_job_runs_total", "Completed job runs");
    describe_counter!("deskhand_job_failures_total", "Job runs that returned an error");
    describe_counter!(
        "deskhand_job_dropped_total",
        "Job invocations dropped because a run was already queued"
    );
    describe_histogram!("deskhand_job_duration_seconds", "Job run duration in seconds");
    describe_counter!("deskhand_notifications_total", "Chat notifications sent");
    describe_counter!("deskhand_webhooks_total", "Inbound webhook deliveries");
    describe_counter!("deskhand_commands_total", "Chat slash commands handled");
}

/// Record an accepted webhook delivery.
pub fn record_webhook(kind: &'static str) {
    metrics::counter!("deskhand_webhooks_total", "kind" => kind).increment(1);
}

/// Record a handled slash command.
pub fn record_command(command: &str) {
    metrics::counter!("deskhand_commands_total", "command" => command.to_string()).increment(1);
}
