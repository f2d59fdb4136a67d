// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal handling for graceful shutdown.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Returns the root cancellation token, cancelled on SIGINT or SIGTERM.
///
/// The task manager, gateway, and release bot all derive from this token, so
/// one signal drains every part of the process.
pub fn install_signal_handler() -> CancellationToken {
    let root = CancellationToken::new();
    let trigger = root.clone();
    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        info!(signal, "initiating shutdown");
        trigger.cancel();
    });
    root
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "Ctrl+C"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_starts_uncancelled() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        let child = token.child_token();
        token.cancel();
        assert!(child.is_cancelled());
    }
}
