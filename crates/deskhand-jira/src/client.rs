// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic-auth JSON client for the Jira REST API.

use std::time::Duration;

use deskhand_core::DeskhandError;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

const API_PREFIX: &str = "/rest/api/2";

#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl JiraClient {
    pub fn new(
        base_url: &str,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, DeskhandError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DeskhandError::with_source("failed to build jira HTTP client", e))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{API_PREFIX}{path}", self.base_url);
        let builder = self.http.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DeskhandError> {
        let response = self.send(path, self.request(Method::GET, path).query(query)).await?;
        response
            .json()
            .await
            .map_err(|e| DeskhandError::with_source(format!("failed to decode jira {path}"), e))
    }

    /// Posts a JSON body, ignoring any response body.
    pub async fn post(&self, path: &str, body: &impl Serialize) -> Result<(), DeskhandError> {
        self.send(path, self.request(Method::POST, path).json(body))
            .await?;
        Ok(())
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Response, DeskhandError> {
        let response = builder
            .send()
            .await
            .map_err(|e| DeskhandError::with_source(format!("jira {path} failed"), e))?;
        let status = response.status();
        debug!(path, status = %status, "jira response received");

        if status == StatusCode::NOT_FOUND {
            return Err(DeskhandError::not_found(format!("jira {path}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeskhandError::internal(format!(
                "jira {path} returned {status}: {body}"
            )));
        }
        Ok(response)
    }
}
