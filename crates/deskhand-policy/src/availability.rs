// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Who is away right now: active AFK timers plus vacations covering today.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use deskhand_core::{DeskhandError, StateStore};

/// Snapshot of unavailable chat users, taken once per run.
#[derive(Debug, Clone, Default)]
pub struct Availability {
    away: HashSet<String>,
}

impl Availability {
    pub async fn load(store: &dyn StateStore, now: DateTime<Utc>) -> Result<Self, DeskhandError> {
        let mut away: HashSet<String> = store
            .list_afk_timers()
            .await?
            .into_iter()
            .filter(|t| t.is_active(now))
            .map(|t| t.user_id)
            .collect();
        away.extend(
            store
                .get_active_vacations(now.date_naive())
                .await?
                .into_iter()
                .map(|v| v.user_id),
        );
        Ok(Self { away })
    }

    pub fn is_away(&self, user_id: &str) -> bool {
        self.away.contains(user_id)
    }
}

impl FromIterator<String> for Availability {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            away: iter.into_iter().collect(),
        }
    }
}
