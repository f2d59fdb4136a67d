// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Webhooks answer as soon as the payload binds; the work itself runs in a
//! detached task and failures are only logged.

use axum::{
    Form, Json,
    extract::{
        State,
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deskhand_policy::{IssueUpdatedEvent, PullRequestMergedEvent, PushEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::server::GatewayState;

/// Body of every successful response.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub result: &'static str,
}

impl OkResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { result: "ok" })
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler can answer with.
#[derive(Debug)]
pub enum ApiError {
    /// The body could not be bound to the expected payload.
    BadRequest(String),
    /// The slash command verification token did not match.
    Forbidden,
    /// Metrics are disabled.
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "invalid token".to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Slack slash-command form.
#[derive(Debug, Deserialize)]
pub struct SlashCommand {
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// GET /healthcheck
pub async fn healthcheck() -> Json<OkResponse> {
    OkResponse::ok()
}

/// GET /metrics
pub async fn metrics(State(state): State<GatewayState>) -> Result<String, ApiError> {
    state
        .prometheus_render
        .as_ref()
        .map(|render| render())
        .ok_or(ApiError::NotFound)
}

/// POST /api/v1/git/onevent/push
pub async fn push(
    State(state): State<GatewayState>,
    payload: Result<Json<PushEvent>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(event) = payload?;
    deskhand_prometheus::record_webhook("push");
    let webhooks = state.webhooks.clone();
    tokio::spawn(async move {
        if let Err(e) = webhooks.push(&event).await {
            warn!(project = %event.project.name, error = %e, "push webhook failed");
        }
    });
    Ok(OkResponse::ok())
}

/// POST /api/v1/jira/onevent/issue-updated
pub async fn issue_updated(
    State(state): State<GatewayState>,
    payload: Result<Json<IssueUpdatedEvent>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(event) = payload?;
    deskhand_prometheus::record_webhook("issue_updated");
    let webhooks = state.webhooks.clone();
    tokio::spawn(async move {
        if let Err(e) = webhooks.issue_updated(&event).await {
            warn!(issue = %event.issue_key, error = %e, "issue webhook failed");
        }
    });
    Ok(OkResponse::ok())
}

/// POST /api/v1/git/onevent/pr-merged
pub async fn pull_request_merged(
    State(state): State<GatewayState>,
    payload: Result<Json<PullRequestMergedEvent>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(event) = payload?;
    deskhand_prometheus::record_webhook("pr_merged");
    let webhooks = state.webhooks.clone();
    tokio::spawn(async move {
        if let Err(e) = webhooks.pull_request_merged(&event).await {
            warn!(
                repository = %event.repository,
                pr = event.pull_request_id,
                error = %e,
                "merge webhook failed"
            );
        }
    });
    Ok(OkResponse::ok())
}

/// POST /api/v1/chat/command
///
/// Replies with plain text, which Slack shows only to the caller.
pub async fn chat_command(
    State(state): State<GatewayState>,
    payload: Result<Form<SlashCommand>, FormRejection>,
) -> Result<String, ApiError> {
    let Form(form) = payload?;
    if let Some(expected) = &state.slash_token {
        if form.token.as_deref() != Some(expected.as_str()) {
            warn!(user = %form.user_id, "slash command with invalid token");
            return Err(ApiError::Forbidden);
        }
    }
    debug!(command = %form.command, user = %form.user_id, channel = %form.channel_id, "slash command");
    deskhand_prometheus::record_command(&form.command);
    Ok(state
        .commands
        .handle(&form.user_id, &form.command, &form.text)
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_serializes() {
        let json = serde_json::to_string(&OkResponse::ok().0).unwrap();
        assert_eq!(json, r#"{"result":"ok"}"#);
    }

    #[test]
    fn api_errors_map_to_statuses() {
        assert_eq!(
            ApiError::BadRequest("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
    }
}
