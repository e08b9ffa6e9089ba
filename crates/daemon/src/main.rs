// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tarod`: the user-level job supervisor daemon.
//!
//! One daemon per host, started by `taro daemon start` (or a user service
//! unit). Reads `TARO_STATE_DIR` / `XDG_STATE_HOME` for its state directory;
//! see [`taro_daemon::Config::load`].

use std::process::ExitCode;
use std::sync::Arc;
use taro_daemon::{lifecycle, Config, ListenCtx, Listener};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut state = match lifecycle::startup(config).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "daemon startup failed");
            return ExitCode::FAILURE;
        }
    };

    let ctx = Arc::new(ListenCtx { supervisor: Arc::clone(&state.supervisor) });
    let listener_task = tokio::spawn(Listener::new(state.take_listener(), ctx).run());

    wait_for_shutdown_signal().await;
    info!("shutdown signal received");
    listener_task.abort();
    state.shutdown().await;

    ExitCode::SUCCESS
}

/// Wait for SIGTERM or SIGINT (spec.md §4.2: the supervisor interrupts every
/// live child and waits for it to exit before itself exiting).
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}
