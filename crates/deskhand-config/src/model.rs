// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a typo in the config
//! file fails startup with a suggestion instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Deskhand configuration.
///
/// Loaded from YAML files following the XDG hierarchy, with `DESKHAND_*`
/// environment overrides. Every section has defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeskhandConfig {
    /// Global ignore list: chat ids, tracker account ids, or names that the
    /// low-priority detector skips.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Process identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// Inbound HTTP server.
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub jira: JiraConfig,

    #[serde(default)]
    pub bitbucket: BitbucketConfig,

    #[serde(default)]
    pub hubstaff: HubstaffConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Team rosters and leads, by chat id.
    #[serde(default)]
    pub teams: TeamsConfig,

    /// User directory entries.
    #[serde(default)]
    pub users: Vec<UserEntry>,

    /// Cron expression per job.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub forgotten: ForgottenConfig,

    #[serde(default)]
    pub webhooks: WebhooksConfig,

    #[serde(default)]
    pub reports: ReportsConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "deskhand".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(default = "default_http_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_dsn")]
    pub dsn: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dsn: default_dsn(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_dsn() -> String {
    dirs::data_dir()
        .map(|p| p.join("deskhand").join("deskhand.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("deskhand.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Team chat (Slack Web API) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SlackConfig {
    #[serde(default = "default_slack_base_url")]
    pub base_url: String,

    /// Token used for reading history, members, and permalinks.
    #[serde(default)]
    pub token_in: Option<String>,

    /// Token used for posting messages and files.
    #[serde(default)]
    pub token_out: Option<String>,

    /// User ids of bots; removed from member sets and their replies ignored.
    #[serde(default)]
    pub bot_ids: Vec<String>,

    /// Minimum spacing between two posts.
    #[serde(default = "default_min_post_interval_ms")]
    pub min_post_interval_ms: u64,

    /// Retries for transient failures (429, 5xx, `ratelimited`).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub channels: ChannelsConfig,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            base_url: default_slack_base_url(),
            token_in: None,
            token_out: None,
            bot_ids: Vec::new(),
            min_post_interval_ms: default_min_post_interval_ms(),
            max_retries: default_max_retries(),
            channels: ChannelsConfig::default(),
        }
    }
}

fn default_slack_base_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_min_post_interval_ms() -> u64 {
    1100
}

fn default_max_retries() -> u32 {
    3
}

/// Channel ids the detectors post into.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelsConfig {
    /// General announcements (low-priority notices, worked-time report).
    #[serde(default)]
    pub general: String,

    /// Forgotten branches and pull requests.
    #[serde(default)]
    pub development: String,

    /// Migration files from push webhooks.
    #[serde(default)]
    pub migrations: String,

    /// Works-ratio spreadsheet.
    #[serde(default)]
    pub reports: String,

    /// Issue status and merge announcements.
    #[serde(default)]
    pub releases: String,
}

/// Issue tracker (Jira REST) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JiraConfig {
    /// Site URL, e.g. `https://example.atlassian.net`. Empty disables the tracker.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Issue types included in the works-ratio report.
    #[serde(default = "default_works_ratio_issue_types")]
    pub works_ratio_issue_types: Vec<String>,

    /// Workflow transition applied when work starts on an `Open` issue.
    #[serde(default = "default_start_transition")]
    pub start_transition: String,

    #[serde(default = "default_open_status")]
    pub open_status: String,

    /// Page size for searches.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            works_ratio_issue_types: default_works_ratio_issue_types(),
            start_transition: default_start_transition(),
            open_status: default_open_status(),
            page_size: default_page_size(),
        }
    }
}

fn default_works_ratio_issue_types() -> Vec<String> {
    vec!["Task".to_string(), "Bug".to_string(), "Story".to_string()]
}

fn default_start_transition() -> String {
    "Start Progress".to_string()
}

fn default_open_status() -> String {
    "Open".to_string()
}

fn default_page_size() -> u32 {
    100
}

/// Source host (Bitbucket Cloud) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BitbucketConfig {
    #[serde(default = "default_bitbucket_base_url")]
    pub base_url: String,

    /// Web URL used to build branch links.
    #[serde(default = "default_bitbucket_web_url")]
    pub web_url: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Workspace that owns the repositories. Empty disables the source host.
    #[serde(default)]
    pub owner: String,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            base_url: default_bitbucket_base_url(),
            web_url: default_bitbucket_web_url(),
            username: None,
            password: None,
            owner: String::new(),
        }
    }
}

fn default_bitbucket_base_url() -> String {
    "https://api.bitbucket.org/2.0".to_string()
}

fn default_bitbucket_web_url() -> String {
    "https://bitbucket.org".to_string()
}

/// Time tracker (Hubstaff v2) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubstaffConfig {
    #[serde(default = "default_hubstaff_base_url")]
    pub base_url: String,

    /// Personal access token. `None` disables the worked-time report.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub org_id: i64,
}

impl Default for HubstaffConfig {
    fn default() -> Self {
        Self {
            base_url: default_hubstaff_base_url(),
            token: None,
            org_id: 0,
        }
    }
}

fn default_hubstaff_base_url() -> String {
    "https://api.hubstaff.com/v2".to_string()
}

/// Release-browser bot settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. `None` disables the release browser.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Team rosters and leads. All values are chat ids.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TeamsConfig {
    #[serde(default)]
    pub backend: Vec<String>,
    #[serde(default)]
    pub frontend: Vec<String>,
    #[serde(default)]
    pub design: Vec<String>,
    #[serde(default)]
    pub devops: Vec<String>,
    #[serde(default)]
    pub backend_leader: Option<String>,
    #[serde(default)]
    pub frontend_leader: Option<String>,
    #[serde(default)]
    pub design_leader: Option<String>,
    #[serde(default)]
    pub devops_leader: Option<String>,
    #[serde(default)]
    pub project_manager: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
}

/// One person across the chat, tracker, source host, and bot namespaces.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserEntry {
    pub chat_id: String,
    /// Real name as shown in chat; also matched against commit authors.
    pub chat_name: String,
    #[serde(default)]
    pub tracker_account_id: Option<String>,
    #[serde(default)]
    pub tracker_name: Option<String>,
    #[serde(default)]
    pub source_host_name: Option<String>,
    #[serde(default)]
    pub time_tracker_id: Option<String>,
    #[serde(default)]
    pub telegram_id: Option<String>,
}

/// Cron expressions for each scheduled job.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    #[serde(default = "default_forgotten_branches_schedule")]
    pub forgotten_branches: String,

    #[serde(default = "default_forgotten_pull_requests_schedule")]
    pub forgotten_pull_requests: String,

    /// Hourly so the `[now-24h, now-23h)` windows tile the day.
    #[serde(default = "default_hourly_schedule")]
    pub mention_reply: String,

    /// Hourly so each run sees the work-logs of the previous hour.
    #[serde(default = "default_hourly_schedule")]
    pub low_priority: String,

    #[serde(default = "default_works_ratio_schedule")]
    pub works_ratio: String,

    #[serde(default = "default_worked_time_schedule")]
    pub worked_time: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            forgotten_branches: default_forgotten_branches_schedule(),
            forgotten_pull_requests: default_forgotten_pull_requests_schedule(),
            mention_reply: default_hourly_schedule(),
            low_priority: default_hourly_schedule(),
            works_ratio: default_works_ratio_schedule(),
            worked_time: default_worked_time_schedule(),
        }
    }
}

fn default_forgotten_branches_schedule() -> String {
    "0 10 * * *".to_string()
}

fn default_forgotten_pull_requests_schedule() -> String {
    "30 10 * * *".to_string()
}

fn default_hourly_schedule() -> String {
    "0 * * * *".to_string()
}

fn default_works_ratio_schedule() -> String {
    "0 9 * * 1".to_string()
}

fn default_worked_time_schedule() -> String {
    "0 8 * * 2-6".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ForgottenConfig {
    /// Delete branches upstream when they reach the final bucket.
    #[serde(default)]
    pub delete_branches: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhooksConfig {
    /// Issue statuses announced by the issue-updated webhook.
    #[serde(default = "default_announce_statuses")]
    pub announce_statuses: Vec<String>,

    /// Push size above which a warning is posted.
    #[serde(default = "default_max_commits")]
    pub max_commits: u64,
}

impl Default for WebhooksConfig {
    fn default() -> Self {
        Self {
            announce_statuses: default_announce_statuses(),
            max_commits: default_max_commits(),
        }
    }
}

fn default_announce_statuses() -> Vec<String> {
    vec!["Ready for QA".to_string(), "Done".to_string()]
}

fn default_max_commits() -> u64 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReportsConfig {
    /// Days of resolved issues covered by the works-ratio report.
    #[serde(default = "default_works_ratio_days")]
    pub works_ratio_days: i64,

    /// Members below this many tracked hours are flagged in the worked-time report.
    #[serde(default = "default_min_daily_hours")]
    pub min_daily_hours: f64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            works_ratio_days: default_works_ratio_days(),
            min_daily_hours: default_min_daily_hours(),
        }
    }
}

fn default_works_ratio_days() -> i64 {
    7
}

fn default_min_daily_hours() -> f64 {
    6.0
}

/// Prometheus metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}
