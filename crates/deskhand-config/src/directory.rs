// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User directory: one person across several identity namespaces.
//!
//! Built once from configuration and read-only afterwards. Two parallel maps
//! back it: `(tag, value) -> user` for lookups by any identity, and
//! `chat_id -> user` for the common chat-side path.

use std::collections::{BTreeMap, HashMap};

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::diagnostic::ConfigError;
use crate::model::{DeskhandConfig, TeamsConfig, UserEntry};

/// Identity namespaces a user can be looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum UserTag {
    ChatId,
    ChatName,
    TrackerAccountId,
    TrackerName,
    SourceHostName,
    TimeTrackerId,
    TelegramId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Team {
    Backend,
    Frontend,
    Design,
    Devops,
}

/// A resolved directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    tags: BTreeMap<UserTag, String>,
    team: Option<Team>,
}

impl User {
    pub fn tag(&self, tag: UserTag) -> Option<&str> {
        self.tags.get(&tag).map(String::as_str)
    }

    pub fn chat_id(&self) -> &str {
        self.tag(UserTag::ChatId).unwrap_or_default()
    }

    pub fn chat_name(&self) -> &str {
        self.tag(UserTag::ChatName).unwrap_or_default()
    }

    pub fn team(&self) -> Option<Team> {
        self.team
    }

    /// Chat mention markup for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.chat_id())
    }

    fn tags(&self) -> impl Iterator<Item = (UserTag, &str)> {
        self.tags.iter().map(|(t, v)| (*t, v.as_str()))
    }
}

/// Bidirectional lookup across identity tags plus team leadership.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
    by_tag: HashMap<(UserTag, String), usize>,
    by_chat_id: HashMap<String, usize>,
    leaders: HashMap<Team, String>,
    project_manager: Option<String>,
    director: Option<String>,
}

impl UserDirectory {
    /// Builds the directory, rejecting any `(tag, value)` pair claimed twice.
    pub fn from_config(config: &DeskhandConfig) -> Result<Self, Vec<ConfigError>> {
        let mut directory = Self {
            leaders: leaders(&config.teams),
            project_manager: config.teams.project_manager.clone(),
            director: config.teams.director.clone(),
            ..Self::default()
        };
        let mut errors = Vec::new();

        for entry in &config.users {
            let user = User {
                tags: entry_tags(entry),
                team: team_of(&config.teams, &entry.chat_id),
            };
            let index = directory.users.len();
            for (tag, value) in user.tags() {
                let key = (tag, value.to_string());
                if directory.by_tag.contains_key(&key) {
                    errors.push(ConfigError::DuplicateIdentity {
                        tag: tag.to_string(),
                        value: value.to_string(),
                    });
                    continue;
                }
                directory.by_tag.insert(key, index);
            }
            directory.by_chat_id.insert(entry.chat_id.clone(), index);
            directory.users.push(user);
        }

        if errors.is_empty() {
            Ok(directory)
        } else {
            Err(errors)
        }
    }

    pub fn find(&self, tag: UserTag, value: &str) -> Option<&User> {
        self.by_tag
            .get(&(tag, value.to_string()))
            .map(|&i| &self.users[i])
    }

    /// First match among `tags`, in order.
    pub fn find_any(&self, tags: &[UserTag], value: &str) -> Option<&User> {
        tags.iter().find_map(|&tag| self.find(tag, value))
    }

    pub fn by_chat_id(&self, chat_id: &str) -> Option<&User> {
        self.by_chat_id.get(chat_id).map(|&i| &self.users[i])
    }

    /// Translates an identity from one namespace to another.
    pub fn lookup(&self, from: UserTag, value: &str, to: UserTag) -> Option<&str> {
        self.find(from, value).and_then(|u| u.tag(to))
    }

    /// Whether any identity of `user` (or the raw value itself) is listed in `ignore`.
    pub fn is_ignored(&self, ignore: &[String], tag: UserTag, value: &str) -> bool {
        if ignore.iter().any(|i| i == value) {
            return true;
        }
        match self.find(tag, value) {
            Some(user) => user.tags().any(|(_, v)| ignore.iter().any(|i| i == v)),
            None => false,
        }
    }

    /// Chat id of the lead for `team`.
    pub fn team_leader(&self, team: Team) -> Option<&str> {
        self.leaders.get(&team).map(String::as_str)
    }

    pub fn project_manager(&self) -> Option<&str> {
        self.project_manager.as_deref()
    }

    pub fn director(&self) -> Option<&str> {
        self.director.as_deref()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn entry_tags(entry: &UserEntry) -> BTreeMap<UserTag, String> {
    UserTag::iter()
        .filter_map(|tag| {
            let value = match tag {
                UserTag::ChatId => Some(&entry.chat_id),
                UserTag::ChatName => Some(&entry.chat_name),
                UserTag::TrackerAccountId => entry.tracker_account_id.as_ref(),
                UserTag::TrackerName => entry.tracker_name.as_ref(),
                UserTag::SourceHostName => entry.source_host_name.as_ref(),
                UserTag::TimeTrackerId => entry.time_tracker_id.as_ref(),
                UserTag::TelegramId => entry.telegram_id.as_ref(),
            }?;
            (!value.trim().is_empty()).then(|| (tag, value.clone()))
        })
        .collect()
}

fn roster(teams: &TeamsConfig, team: Team) -> &[String] {
    match team {
        Team::Backend => &teams.backend,
        Team::Frontend => &teams.frontend,
        Team::Design => &teams.design,
        Team::Devops => &teams.devops,
    }
}

fn team_of(teams: &TeamsConfig, chat_id: &str) -> Option<Team> {
    Team::iter().find(|&team| roster(teams, team).iter().any(|m| m == chat_id))
}

fn leaders(teams: &TeamsConfig) -> HashMap<Team, String> {
    [
        (Team::Backend, &teams.backend_leader),
        (Team::Frontend, &teams.frontend_leader),
        (Team::Design, &teams.design_leader),
        (Team::Devops, &teams.devops_leader),
    ]
    .into_iter()
    .filter_map(|(team, leader)| leader.clone().map(|l| (team, l)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(chat_id: &str, name: &str, tracker: &str) -> UserEntry {
        UserEntry {
            chat_id: chat_id.into(),
            chat_name: name.into(),
            tracker_account_id: Some(tracker.into()),
            ..UserEntry::default()
        }
    }

    fn config() -> DeskhandConfig {
        let mut config = DeskhandConfig::default();
        config.users = vec![
            entry("U1", "Ada Lovelace", "acc-1"),
            entry("U2", "Alan Turing", "acc-2"),
        ];
        config.teams.backend = vec!["U1".into()];
        config.teams.backend_leader = Some("U9".into());
        config.teams.project_manager = Some("U8".into());
        config
    }

    #[test]
    fn lookup_across_namespaces() {
        let dir = UserDirectory::from_config(&config()).unwrap();
        assert_eq!(
            dir.lookup(UserTag::TrackerAccountId, "acc-2", UserTag::ChatId),
            Some("U2")
        );
        assert_eq!(
            dir.find(UserTag::ChatName, "Ada Lovelace").map(User::chat_id),
            Some("U1")
        );
        assert!(dir.find(UserTag::ChatName, "Nobody").is_none());
    }

    #[test]
    fn team_and_leader_resolution() {
        let dir = UserDirectory::from_config(&config()).unwrap();
        let ada = dir.by_chat_id("U1").unwrap();
        assert_eq!(ada.team(), Some(Team::Backend));
        assert_eq!(dir.team_leader(Team::Backend), Some("U9"));
        assert_eq!(dir.by_chat_id("U2").unwrap().team(), None);
        assert_eq!(dir.project_manager(), Some("U8"));
    }

    #[test]
    fn duplicate_tag_values_are_rejected() {
        let mut cfg = config();
        cfg.users.push(entry("U3", "Ada Lovelace", "acc-3"));
        let errors = UserDirectory::from_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("chat_name `Ada Lovelace`"));
    }

    #[test]
    fn ignore_matches_any_identity() {
        let dir = UserDirectory::from_config(&config()).unwrap();
        let ignore = vec!["U2".to_string()];
        assert!(dir.is_ignored(&ignore, UserTag::TrackerAccountId, "acc-2"));
        assert!(!dir.is_ignored(&ignore, UserTag::TrackerAccountId, "acc-1"));
        assert!(dir.is_ignored(&["acc-7".to_string()], UserTag::TrackerAccountId, "acc-7"));
    }
}
