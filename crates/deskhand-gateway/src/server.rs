// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use deskhand_core::DeskhandError;
use deskhand_policy::{ChatCommands, Webhooks};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub webhooks: Arc<Webhooks>,
    pub commands: Arc<ChatCommands>,
    /// Expected slash command verification token; `None` accepts any.
    pub slash_token: Option<String>,
    /// Prometheus render function; `None` disables `/metrics`.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the application router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/healthcheck", get(handlers::healthcheck))
        .route("/metrics", get(handlers::metrics))
        .route("/api/v1/git/onevent/push", post(handlers::push))
        .route("/api/v1/jira/onevent/issue-updated", post(handlers::issue_updated))
        .route("/api/v1/git/onevent/pr-merged", post(handlers::pull_request_merged))
        .route("/api/v1/chat/command", post(handlers::chat_command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds and serves until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), DeskhandError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DeskhandError::with_source(format!("failed to bind gateway to {addr}"), e))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| DeskhandError::with_source("gateway server error", e))?;

    tracing::info!("gateway stopped");
    Ok(())
}
