// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Deskhand configuration system.

use deskhand_config::diagnostic::{ConfigError, suggest_key};
use deskhand_config::{
    Team, UserDirectory, UserTag, load_and_validate_path, load_and_validate_str,
    load_config_from_str,
};

const FULL: &str = r#"
ignore: [U9]

app:
  name: office-bot
  log_level: debug

http:
  host: 127.0.0.1
  port: 8181

storage:
  dsn: /tmp/deskhand-test.db
  wal_mode: false

slack:
  token_in: xoxp-in
  token_out: xoxb-out
  bot_ids: [B01]
  channels:
    general: C-general
    reports: C-reports
    releases: C-releases

jira:
  base_url: https://tracker.example.com
  username: bot
  password: secret

bitbucket:
  owner: acme

hubstaff:
  token: hs-token
  org_id: 42

teams:
  backend: [U1]
  frontend: [U2]
  backend_leader: U1
  project_manager: U2

users:
  - chat_id: U1
    chat_name: Ada Lovelace
    tracker_account_id: acc-1
    source_host_name: ada
    time_tracker_id: "1001"
  - chat_id: U2
    chat_name: Alan Turing
    tracker_account_id: acc-2
    telegram_id: "77"

schedule:
  works_ratio: "0 9 * * 1"

reports:
  works_ratio_days: 14
  min_daily_hours: 5.5
"#;

#[test]
fn full_config_deserializes() {
    let config = load_and_validate_str(FULL).expect("valid config");
    assert_eq!(config.app.name, "office-bot");
    assert_eq!(config.http.port, 8181);
    assert_eq!(config.storage.dsn, "/tmp/deskhand-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.slack.token_out.as_deref(), Some("xoxb-out"));
    assert_eq!(config.slack.channels.reports, "C-reports");
    assert_eq!(config.hubstaff.org_id, 42);
    assert_eq!(config.reports.works_ratio_days, 14);
    assert_eq!(config.ignore, vec!["U9"]);
    assert_eq!(config.users.len(), 2);
}

#[test]
fn omitted_sections_take_defaults() {
    let config = load_config_from_str("").expect("empty config is fine");
    assert_eq!(config.app.name, "deskhand");
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.slack.base_url, "https://slack.com/api");
    assert_eq!(config.schedule.mention_reply, "0 * * * *");
    assert!(!config.forgotten.delete_branches);
}

#[test]
fn directory_built_from_config_resolves_identities() {
    let config = load_and_validate_str(FULL).unwrap();
    let directory = UserDirectory::from_config(&config).unwrap();

    assert_eq!(directory.len(), 2);
    assert_eq!(
        directory.lookup(UserTag::SourceHostName, "ada", UserTag::ChatId),
        Some("U1")
    );
    assert_eq!(
        directory.lookup(UserTag::TelegramId, "77", UserTag::ChatName),
        Some("Alan Turing")
    );
    assert_eq!(directory.by_chat_id("U2").unwrap().team(), Some(Team::Frontend));
    assert_eq!(directory.team_leader(Team::Backend), Some("U1"));
}

#[test]
fn typo_in_section_gets_suggestion() {
    let errors = load_and_validate_str("slack:\n  token_oot: x\n").unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "token_oot");
            assert_eq!(suggestion.as_deref(), Some("token_out"));
            assert!(span.is_some(), "inline source should carry a span");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("http:\n  port: eighty\n").unwrap_err();
    assert!(
        matches!(&errors[0], ConfigError::InvalidType { key, .. } if key == "http.port"),
        "got {errors:?}"
    );
}

#[test]
fn duplicate_user_identity_fails_validation() {
    let yaml = r#"
users:
  - chat_id: U1
    chat_name: Ada
    tracker_account_id: acc-1
  - chat_id: U2
    chat_name: Alan
    tracker_account_id: acc-1
"#;
    let errors = load_and_validate_str(yaml).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("tracker_account_id `acc-1`"));
}

#[test]
fn invalid_schedule_fails_validation() {
    let errors = load_and_validate_str("schedule:\n  low_priority: \"61 * * * *\"\n").unwrap_err();
    assert!(errors[0].to_string().contains("schedule.low_priority"));
}

#[test]
fn explicit_path_must_exist() {
    let errors =
        load_and_validate_path(std::path::Path::new("/nonexistent/deskhand.yaml")).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::Other(msg) if msg.contains("does not exist")));
}

#[test]
fn explicit_path_is_loaded() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("custom.yaml", "http:\n  port: 9999\n")?;
        let path = jail.directory().join("custom.yaml");
        let config = load_and_validate_path(&path).expect("valid file");
        assert_eq!(config.http.port, 9999);
        Ok(())
    });
}

#[test]
fn suggest_key_ignores_distant_names() {
    let valid = ["token_in", "token_out", "base_url"];
    assert_eq!(suggest_key("tokn_in", &valid).as_deref(), Some("token_in"));
    assert_eq!(suggest_key("zzz", &valid), None);
}

#[test]
fn unknown_key_in_file_points_at_the_line() {
    figment::Jail::expect_with(|jail| {
        let content = "http:\n  port: 9000\nslack:\n  token_out: xoxb\n  bot_idz: [B1]\n";
        jail.create_file("typo.yaml", content)?;
        let path = jail.directory().join("typo.yaml");
        let errors = load_and_validate_path(&path).unwrap_err();
        match &errors[0] {
            ConfigError::UnknownKey {
                suggestion, span, ..
            } => {
                assert_eq!(suggestion.as_deref(), Some("bot_ids"));
                let span = span.expect("file source should carry a span");
                assert_eq!(span.offset(), content.find("bot_idz").unwrap());
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
        Ok(())
    });
}

/// The forgotten jobs must see every calendar day so no age bucket is skipped.
#[test]
fn forgotten_jobs_run_on_weekends_by_default() {
    use std::str::FromStr;

    use chrono::{Datelike, TimeZone, Utc, Weekday};
    use croner::Cron;

    let config = load_config_from_str("").unwrap();
    // Friday 2026-10-16, after the morning runs.
    let friday = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
    for expr in [
        &config.schedule.forgotten_branches,
        &config.schedule.forgotten_pull_requests,
    ] {
        let cron = Cron::from_str(expr).unwrap();
        let saturday = cron.find_next_occurrence(&friday, false).unwrap();
        assert_eq!(saturday.weekday(), Weekday::Sat, "{expr}");
        let sunday = cron.find_next_occurrence(&saturday, false).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun, "{expr}");
    }
}
