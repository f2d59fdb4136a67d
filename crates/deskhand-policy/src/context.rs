// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Everything a detector run can reach.

use std::sync::Arc;

use deskhand_config::{DeskhandConfig, UserDirectory};
use deskhand_core::{Clock, DeskhandError, IssueTracker, SourceHost, StateStore, TimeTracker};
use tokio_util::sync::CancellationToken;

use crate::dispatch::Dispatcher;

/// Shared handles to configuration, ports, and the store.
///
/// Cheap to clone. `cancel` is replaced per run by the task manager's token.
#[derive(Clone)]
pub struct DetectorContext {
    pub config: Arc<DeskhandConfig>,
    pub directory: Arc<UserDirectory>,
    pub store: Arc<dyn StateStore>,
    pub issues: Arc<dyn IssueTracker>,
    pub source: Arc<dyn SourceHost>,
    pub time: Arc<dyn TimeTracker>,
    pub dispatcher: Dispatcher,
    pub clock: Arc<dyn Clock>,
    pub cancel: CancellationToken,
}

impl DetectorContext {
    /// A copy of this context observing `cancel`.
    pub fn with_cancel(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..self.clone()
        }
    }

    /// Fails once shutdown has been requested; detectors call this between
    /// external calls.
    pub fn ensure_running(&self) -> Result<(), DeskhandError> {
        if self.cancel.is_cancelled() {
            return Err(DeskhandError::internal("run cancelled by shutdown"));
        }
        Ok(())
    }
}
