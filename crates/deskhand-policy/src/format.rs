// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat markup helpers.

use deskhand_config::{UserDirectory, UserTag};

pub const UNKNOWN_USER: &str = "unknown user";

pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

pub fn link(url: &str, label: &str) -> String {
    format!("<{url}|{label}>")
}

pub fn issue_url(base_url: &str, key: &str) -> String {
    format!("{}/browse/{key}", base_url.trim_end_matches('/'))
}

pub fn issue_link(base_url: &str, key: &str) -> String {
    link(&issue_url(base_url, key), key)
}

/// Mention for a source-host author, matched on source-host name first and
/// then on chat real name.
pub fn author_mention(directory: &UserDirectory, author: &str) -> String {
    directory
        .find_any(&[UserTag::SourceHostName, UserTag::ChatName], author)
        .map(|u| u.mention())
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_link_trims_trailing_slash() {
        assert_eq!(
            issue_link("https://t.example.com/", "API-7"),
            "<https://t.example.com/browse/API-7|API-7>"
        );
    }

    #[test]
    fn unknown_author_is_labelled() {
        let directory = UserDirectory::default();
        assert_eq!(author_mention(&directory, "stranger"), UNKNOWN_USER);
    }
}
