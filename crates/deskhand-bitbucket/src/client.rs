// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic-auth client for the Bitbucket Cloud 2.0 API.

use std::time::Duration;

use deskhand_core::DeskhandError;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::Page;

#[derive(Debug, Clone)]
pub struct BitbucketClient {
    http: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl BitbucketClient {
    pub fn new(
        base_url: &str,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, DeskhandError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DeskhandError::with_source("failed to build bitbucket HTTP client", e))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Collects every page of a listing, following `next` links.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, DeskhandError> {
        let mut values = Vec::new();
        let mut builder = self.request(Method::GET, &self.url(path)).query(query);
        loop {
            let page: Page<T> = self
                .send(path, builder)
                .await?
                .json()
                .await
                .map_err(|e| DeskhandError::with_source(format!("failed to decode bitbucket {path}"), e))?;
            values.extend(page.values);
            match page.next {
                Some(next) => builder = self.request(Method::GET, &next),
                None => return Ok(values),
            }
        }
    }

    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, DeskhandError> {
        let response = self
            .send(path, self.request(Method::GET, &self.url(path)))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DeskhandError::with_source(format!("failed to read bitbucket {path}"), e))?;
        Ok(bytes.to_vec())
    }

    pub async fn delete(&self, path: &str) -> Result<(), DeskhandError> {
        self.send(path, self.request(Method::DELETE, &self.url(path)))
            .await?;
        Ok(())
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Response, DeskhandError> {
        let response = builder
            .send()
            .await
            .map_err(|e| DeskhandError::with_source(format!("bitbucket {path} failed"), e))?;
        let status = response.status();
        debug!(path, status = %status, "bitbucket response received");

        if status == StatusCode::NOT_FOUND {
            return Err(DeskhandError::not_found(format!("bitbucket {path}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeskhandError::internal(format!(
                "bitbucket {path} returned {status}: {body}"
            )));
        }
        Ok(response)
    }
}
