// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics rendered through miette.
//!
//! Figment extraction errors are mapped onto [`ConfigError`] variants. Unknown
//! keys carry a "did you mean?" hint and, when the offending file is known, a
//! labelled span pointing at the key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler similarity above which a known key is offered as a fix.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(deskhand::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a deskhand setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(deskhand::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(deskhand::config::missing_key),
        help("add `{key}: <value>` to deskhand.yaml")
    )]
    MissingKey { key: String },

    /// A job schedule that croner rejects.
    #[error("invalid cron expression for `schedule.{job}`: `{expr}` ({reason})")]
    #[diagnostic(
        code(deskhand::config::schedule),
        help("use five fields: minute hour day-of-month month day-of-week")
    )]
    InvalidSchedule {
        job: String,
        expr: String,
        reason: String,
    },

    /// Two directory entries claim the same identity.
    #[error("users: {tag} `{value}` is assigned to more than one user")]
    #[diagnostic(
        code(deskhand::config::duplicate_identity),
        help("every chat id, tracker account, and alias must map to a single person")
    )]
    DuplicateIdentity { tag: String, value: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(deskhand::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(deskhand::config::other))]
    Other(String),
}

impl ConfigError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Map every error inside a `figment::Error` onto a [`ConfigError`].
///
/// `sources` pairs file paths with their contents so unknown keys can be
/// located in the file they came from.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, sources))
        .collect()
}

fn convert(error: &figment::Error, sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = locate(error, field, sources);
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: dotted(&error.path, Some(&**field)),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: dotted(&error.path, None),
            detail: format!("found {actual}, expected {expected}"),
            expected: expected.to_string(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// `slack.channels.general` style key for error messages.
fn dotted(path: &[String], leaf: Option<&str>) -> String {
    path.iter()
        .map(String::as_str)
        .chain(leaf)
        .collect::<Vec<_>>()
        .join(".")
}

fn locate(
    error: &figment::Error,
    field: &str,
    sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline strings have no file source.
    let source = match file {
        Some(path) => sources.iter().find(|(p, _)| *p == path),
        None if sources.len() == 1 => sources.first(),
        None => None,
    };

    let Some((path, content)) = source else {
        return (None, None);
    };
    match find_key_offset(content, &error.path, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` in YAML `content`, found by descending through the
/// block mappings named by `path` (`slack:` then `channels:`).
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let mut wanted = path.iter().map(String::as_str).chain(Some(field)).peekable();
    let mut parent: Option<usize> = None;
    let mut level: Option<usize> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let body = line.trim_start_matches(' ');
        if body.trim().is_empty() || body.starts_with('#') {
            continue;
        }
        let indent = line.len() - body.len();
        if parent.is_some_and(|p| indent <= p) {
            // Dedented out of the enclosing mapping.
            return None;
        }
        let current = *level.get_or_insert(indent);
        if indent != current {
            continue;
        }
        let key = *wanted.peek()?;
        if body.strip_prefix(key).is_some_and(|rest| rest.starts_with(':')) {
            wanted.next();
            if wanted.peek().is_none() {
                return Some(start + indent);
            }
            parent = Some(indent);
            level = None;
        }
    }
    None
}

/// The closest known key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print each error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_token_out_for_typo() {
        let valid = &["token_in", "token_out", "bot_ids"];
        assert_eq!(suggest_key("tokn_out", valid), Some("token_out".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["dsn", "wal_mode"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn key_offset_in_nested_mapping() {
        let content = "slack:\n  token_out: x\n  # channels\n  channels:\n    genral: C1\n";
        let path = vec!["slack".to_string(), "channels".to_string()];
        let o = find_key_offset(content, &path, "genral").unwrap();
        assert_eq!(&content[o..o + 6], "genral");
    }

    #[test]
    fn key_offset_stops_at_next_section() {
        let content = "storage:\n  wal_mode: true\nhttp:\n  dns: 1\n";
        let path = vec!["storage".to_string()];
        assert_eq!(find_key_offset(content, &path, "dns"), None);
    }

    #[test]
    fn key_offset_ignores_deeper_keys() {
        let content = "http:\n  port: 1\nport: 2\n";
        let o = find_key_offset(content, &[], "port").unwrap();
        assert_eq!(o, content.rfind("port").unwrap());
    }

    #[test]
    fn key_offset_missing_section() {
        let content = "http:\n  port: 1\n";
        let path = vec!["storage".to_string()];
        assert_eq!(find_key_offset(content, &path, "port"), None);
    }

    #[test]
    fn dotted_path_includes_leaf() {
        let path = vec!["slack".to_string()];
        assert_eq!(dotted(&path, Some("token_out")), "slack.token_out");
        assert_eq!(dotted(&path, None), "slack");
    }

    #[test]
    fn schedule_error_names_the_job() {
        let e = ConfigError::InvalidSchedule {
            job: "works_ratio".into(),
            expr: "every monday".into(),
            reason: "bad pattern".into(),
        };
        assert!(e.to_string().contains("schedule.works_ratio"));
    }
}
