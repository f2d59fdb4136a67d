// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound HTTP surface for Deskhand.
//!
//! Routes:
//! - `GET /healthcheck`
//! - `GET /metrics` (when a Prometheus renderer is attached)
//! - `POST /api/v1/git/onevent/push`
//! - `POST /api/v1/jira/onevent/issue-updated`
//! - `POST /api/v1/git/onevent/pr-merged`
//! - `POST /api/v1/chat/command`

pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, router, start_server};
