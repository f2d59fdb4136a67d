// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat slash commands.
//!
//! | Command | Effect |
//! |---------|--------|
//! | `/protect <branch> [comment]` | add a protected name |
//! | `/unprotect <branch>` | remove a protected name |
//! | `/protected` | list protected names |
//! | `/skip <pr-title>` | protect a pull request title |
//! | `/afk <duration>` | set an AFK timer |
//! | `/back` | clear AFK timer and vacation |
//! | `/vacation <start> <end> [msg]` | record a vacation |
//!
//! Every command answers with a plain-text reply; failures are rendered as
//! text too.

use std::sync::Arc;

use chrono::NaiveDate;
use deskhand_core::duration::{format_duration, parse_duration};
use deskhand_core::entities::{AfkTimer, ProtectedName, Vacation};
use deskhand_core::{Clock, DeskhandError, StateStore};
use tracing::{info, warn};

use crate::format::mention;

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Protect { name: String, comment: String },
    Unprotect { name: String },
    Protected,
    Skip { title: String },
    Afk { duration: String },
    Back,
    Vacation {
        start: String,
        end: String,
        message: String,
    },
}

impl ChatCommand {
    /// Parses `command` (with or without its leading slash) and its argument
    /// text. The error is the reply to send.
    pub fn parse(command: &str, text: &str) -> Result<Self, String> {
        let text = text.trim();
        let name = command.trim().trim_start_matches('/');
        let (first, rest) = match text.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim()),
            None => (text, ""),
        };
        let required = |usage: &str| -> Result<(), String> {
            if text.is_empty() {
                Err(format!("usage: {usage}"))
            } else {
                Ok(())
            }
        };

        match name {
            "protect" => {
                required("/protect <branch> [comment]")?;
                Ok(Self::Protect {
                    name: first.to_string(),
                    comment: rest.to_string(),
                })
            }
            "unprotect" => {
                required("/unprotect <branch>")?;
                Ok(Self::Unprotect {
                    name: first.to_string(),
                })
            }
            "protected" => Ok(Self::Protected),
            "skip" => {
                required("/skip <pr-title>")?;
                Ok(Self::Skip {
                    title: text.to_string(),
                })
            }
            "afk" => {
                required("/afk <duration>")?;
                Ok(Self::Afk {
                    duration: text.to_string(),
                })
            }
            "back" => Ok(Self::Back),
            "vacation" => {
                let mut parts = text.splitn(3, char::is_whitespace);
                match (parts.next(), parts.next()) {
                    (Some(start), Some(end)) if !start.is_empty() => Ok(Self::Vacation {
                        start: start.to_string(),
                        end: end.trim().to_string(),
                        message: parts.next().unwrap_or_default().trim().to_string(),
                    }),
                    _ => Err("usage: /vacation <YYYY-MM-DD> <YYYY-MM-DD> [message]".to_string()),
                }
            }
            other => Err(format!("unknown command `/{other}`")),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("`{value}` is not a date, use YYYY-MM-DD"))
}

/// Executes chat commands against the store.
#[derive(Clone)]
pub struct ChatCommands {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
}

impl ChatCommands {
    pub fn new(store: Arc<dyn StateStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Parses and runs one command issued by `user_id`, returning the reply.
    pub async fn handle(&self, user_id: &str, command: &str, text: &str) -> String {
        let parsed = match ChatCommand::parse(command, text) {
            Ok(parsed) => parsed,
            Err(reply) => return reply,
        };
        match self.execute(user_id, parsed).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(user = user_id, command, error = %e, "chat command failed");
                format!("something went wrong: {e}")
            }
        }
    }

    async fn execute(&self, user_id: &str, command: ChatCommand) -> Result<String, DeskhandError> {
        match command {
            ChatCommand::Protect { name, comment } => self.protect(user_id, name, comment).await,
            ChatCommand::Skip { title } => self.protect(user_id, title, "skip".to_string()).await,
            ChatCommand::Unprotect { name } => match self.store.delete_protected_name(&name).await {
                Ok(()) => {
                    info!(user = user_id, %name, "name unprotected");
                    Ok(format!("`{name}` is no longer protected"))
                }
                Err(e) if e.is_not_found() => Ok(format!("`{name}` is not protected")),
                Err(e) => Err(e),
            },
            ChatCommand::Protected => {
                let names = self.store.list_protected_names().await?;
                if names.is_empty() {
                    return Ok("nothing is protected".to_string());
                }
                let lines: Vec<String> = names
                    .iter()
                    .map(|p| {
                        let mut line = format!("• `{}` by {}", p.name, mention(&p.user_id));
                        if !p.comment.is_empty() {
                            line.push_str(&format!(": {}", p.comment));
                        }
                        line
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
            ChatCommand::Afk { duration } => {
                let Ok(duration) = parse_duration(&duration) else {
                    return Ok(format!(
                        "invalid duration `{duration}`, use e.g. 30m, 2h, 1h30m (at most 365d)"
                    ));
                };
                let timer = AfkTimer {
                    user_id: user_id.to_string(),
                    duration_secs: duration.num_seconds(),
                    updated_at: self.clock.now(),
                };
                self.store.upsert_afk_timer(&timer).await?;
                info!(user = user_id, secs = timer.duration_secs, "afk timer set");
                Ok(format!("you are away for {}", format_duration(timer.duration_secs)?))
            }
            ChatCommand::Back => {
                let mut cleared = false;
                for result in [
                    self.store.delete_afk_timer(user_id).await,
                    self.store.delete_vacation(user_id).await,
                ] {
                    match result {
                        Ok(()) => cleared = true,
                        Err(e) if e.is_not_found() => {}
                        Err(e) => return Err(e),
                    }
                }
                Ok(if cleared {
                    "welcome back".to_string()
                } else {
                    "you were not away".to_string()
                })
            }
            ChatCommand::Vacation {
                start,
                end,
                message,
            } => {
                let (start, end) = match (parse_date(&start), parse_date(&end)) {
                    (Ok(s), Ok(e)) => (s, e),
                    (Err(reply), _) | (_, Err(reply)) => return Ok(reply),
                };
                let vacation = match Vacation::new(user_id, start, end, message) {
                    Ok(v) => v,
                    Err(_) => return Ok(format!("vacation can not end ({end}) before it starts ({start})")),
                };
                self.store.upsert_vacation(&vacation).await?;
                info!(user = user_id, %start, %end, "vacation recorded");
                Ok(format!("vacation recorded from {start} to {end}"))
            }
        }
    }

    async fn protect(
        &self,
        user_id: &str,
        name: String,
        comment: String,
    ) -> Result<String, DeskhandError> {
        match self.store.get_protected_name(&name).await {
            Ok(existing) => {
                return Ok(format!(
                    "`{name}` is already protected by {}",
                    mention(&existing.user_id)
                ));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        let row = ProtectedName {
            name: name.clone(),
            user_id: user_id.to_string(),
            comment,
            created_at: self.clock.now(),
        };
        self.store.create_protected_name(&row).await?;
        info!(user = user_id, %name, "name protected");
        Ok(format!("`{name}` is protected now"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_protect_with_comment() {
        assert_eq!(
            ChatCommand::parse("/protect", "feature/x keep for demo").unwrap(),
            ChatCommand::Protect {
                name: "feature/x".into(),
                comment: "keep for demo".into(),
            }
        );
    }

    #[test]
    fn skip_keeps_whole_title() {
        assert_eq!(
            ChatCommand::parse("skip", "  WIP: new login flow ").unwrap(),
            ChatCommand::Skip {
                title: "WIP: new login flow".into(),
            }
        );
    }

    #[test]
    fn missing_arguments_reply_with_usage() {
        assert!(ChatCommand::parse("/protect", "").unwrap_err().starts_with("usage:"));
        assert!(ChatCommand::parse("/vacation", "2026-01-01").unwrap_err().starts_with("usage:"));
    }

    #[test]
    fn vacation_message_is_optional() {
        assert_eq!(
            ChatCommand::parse("/vacation", "2026-01-01 2026-01-05").unwrap(),
            ChatCommand::Vacation {
                start: "2026-01-01".into(),
                end: "2026-01-05".into(),
                message: String::new(),
            }
        );
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            ChatCommand::parse("/deploy", "prod").unwrap_err(),
            "unknown command `/deploy`"
        );
    }
}
