// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for Deskhand.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. Metrics are
//! rendered as Prometheus text through the gateway's `/metrics` endpoint.

pub mod recording;

use async_trait::async_trait;
use deskhand_core::types::{AdapterType, HealthStatus};
use deskhand_core::{DeskhandError, PluginAdapter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub use recording::{record_command, record_webhook, register_metrics};

/// Installs the Prometheus recorder and renders collected metrics.
pub struct PrometheusExporter {
    handle: PrometheusHandle,
}

impl PrometheusExporter {
    /// Installs the recorder globally.
    ///
    /// Only one recorder can be installed per process; a second call fails.
    pub fn install() -> Result<Self, DeskhandError> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| DeskhandError::with_source("failed to install prometheus recorder", e))?;

        recording::register_metrics();
        tracing::info!("prometheus metrics recorder installed");
        Ok(Self { handle })
    }

    /// Wraps an existing handle without installing anything.
    pub fn from_handle(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusExporter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskhandError> {
        Ok(())
    }
}
