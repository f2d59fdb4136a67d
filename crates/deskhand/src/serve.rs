// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `deskhand serve` command implementation.
//!
//! Opens the state store, builds every adapter from configuration, registers
//! the detectors with the task manager, and runs the HTTP gateway and the
//! release bot until a shutdown signal arrives.

use std::sync::Arc;

use deskhand_bitbucket::BitbucketSource;
use deskhand_config::{DeskhandConfig, UserDirectory};
use deskhand_core::{
    Clock, DeskhandError, IssueTracker, MessagingBot, PluginAdapter, StateStore, SystemClock,
};
use deskhand_cron::TaskManager;
use deskhand_gateway::{GatewayState, ServerConfig};
use deskhand_hubstaff::HubstaffTracker;
use deskhand_jira::JiraTracker;
use deskhand_policy::{ChatCommands, DetectorContext, Dispatcher, ReleaseBot, Webhooks};
use deskhand_prometheus::PrometheusExporter;
use deskhand_slack::SlackChat;
use deskhand_storage::SqliteStore;
use deskhand_telegram::TelegramBot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs until SIGINT/SIGTERM, then drains jobs and exits.
pub async fn run_serve(config: DeskhandConfig) -> Result<(), DeskhandError> {
    init_tracing(&config.app.log_level);
    info!(name = %config.app.name, "starting deskhand");

    let directory = UserDirectory::from_config(&config).map_err(|errors| {
        deskhand_config::render_errors(&errors);
        DeskhandError::internal("user directory is invalid")
    })?;
    let directory = Arc::new(directory);
    let config = Arc::new(config);

    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let chat = Arc::new(SlackChat::new(&config.slack)?);
    let jira = Arc::new(JiraTracker::new(&config.jira)?);
    let source = Arc::new(BitbucketSource::new(&config.bitbucket)?);
    let time = Arc::new(HubstaffTracker::new(&config.hubstaff)?);

    report_health(&[
        store.as_ref() as &dyn PluginAdapter,
        chat.as_ref(),
        jira.as_ref(),
        source.as_ref(),
        time.as_ref(),
    ])
    .await;

    let prometheus = if config.metrics.enabled {
        match PrometheusExporter::install() {
            Ok(exporter) => Some(Arc::new(exporter)),
            Err(e) => {
                warn!(error = %e, "metrics disabled");
                None
            }
        }
    } else {
        None
    };

    let cancel = shutdown::install_signal_handler();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn StateStore> = store;
    let issues: Arc<dyn IssueTracker> = jira;
    let dispatcher = Dispatcher::new(chat.clone());

    let ctx = DetectorContext {
        config: config.clone(),
        directory: directory.clone(),
        store: store.clone(),
        issues: issues.clone(),
        source: source.clone(),
        time,
        dispatcher: dispatcher.clone(),
        clock: clock.clone(),
        cancel: cancel.clone(),
    };

    let manager = TaskManager::with_cancellation(clock.clone(), cancel.child_token());
    deskhand_policy::register_detectors(&manager, &ctx)
        .map_err(|e| DeskhandError::with_source("failed to register detectors", e))?;
    manager.start();

    let state = GatewayState {
        webhooks: Arc::new(Webhooks::new(
            config.clone(),
            directory,
            source,
            dispatcher,
        )),
        commands: Arc::new(ChatCommands::new(store.clone(), clock)),
        slash_token: config.slack.token_in.clone().filter(|t| !t.is_empty()),
        prometheus_render: prometheus.map(|exporter| {
            Arc::new(move || exporter.render()) as Arc<dyn Fn() -> String + Send + Sync>
        }),
    };
    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };
    let gateway = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = deskhand_gateway::start_server(&server_config, state, cancel.clone()).await {
                error!(error = %e, "gateway failed");
                cancel.cancel();
            }
        })
    };

    let release_bot = spawn_release_bot(&config, store, issues, cancel.clone())?;

    cancel.cancelled().await;
    info!("shutting down");

    manager.stop().await;
    if let Err(e) = gateway.await {
        warn!(error = %e, "gateway task ended abnormally");
    }
    if let Some(handle) = release_bot {
        if let Err(e) = handle.await {
            warn!(error = %e, "release bot task ended abnormally");
        }
    }
    chat.shutdown().await?;

    info!("deskhand stopped");
    Ok(())
}

/// Starts the Telegram release bot when an API key is configured.
fn spawn_release_bot(
    config: &DeskhandConfig,
    store: Arc<dyn StateStore>,
    issues: Arc<dyn IssueTracker>,
    cancel: CancellationToken,
) -> Result<Option<JoinHandle<()>>, DeskhandError> {
    if config.telegram.api_key.as_deref().is_none_or(str::is_empty) {
        info!("telegram.api_key not set, release bot disabled");
        return Ok(None);
    }
    let bot = Arc::new(TelegramBot::new(&config.telegram)?);
    let release_bot = ReleaseBot::new(bot.clone() as Arc<dyn MessagingBot>, store, issues);

    Ok(Some(tokio::spawn(async move {
        if let Err(e) = release_bot.run(cancel).await {
            error!(error = %e, "release bot failed");
        }
        if let Err(e) = bot.shutdown().await {
            warn!(error = %e, "telegram shutdown failed");
        }
    })))
}

/// Logs each adapter's health without blocking startup.
async fn report_health(adapters: &[&dyn PluginAdapter]) {
    for adapter in adapters {
        match adapter.health_check().await {
            Ok(status) => info!(adapter = adapter.name(), status = ?status, "adapter health"),
            Err(e) => warn!(adapter = adapter.name(), error = %e, "adapter health check failed"),
        }
    }
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("deskhand={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
