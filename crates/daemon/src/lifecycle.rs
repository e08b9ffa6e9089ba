// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and shutdown (spec.md §4.12, §9 crash recovery).

use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::supervisor::Supervisor;
use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use taro_adapters::UnixProcessRunner;
use taro_core::EventBus;
use taro_storage::{Db, DisabledRegistry, HistoryStore};
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Daemon state during operation. Held by `main` for the lifetime of the
/// process; `listener` is taken out and run as its own task.
pub struct DaemonState {
    pub config: Config,
    // Held only to keep the exclusive lock alive; released on drop.
    #[allow(dead_code)]
    lock_file: File,
    pub supervisor: Arc<Supervisor>,
    listener: Option<UnixListener>,
}

impl DaemonState {
    /// Take ownership of the bound socket listener. Panics if called twice.
    pub fn take_listener(&mut self) -> UnixListener {
        self.listener.take().expect("listener already taken")
    }
}

/// Start the daemon: acquire the single-instance lock, open persistence
/// (unless disabled), and bind the socket last so a half-started daemon
/// never appears reachable (spec.md §4.12).
pub async fn startup(config: Config) -> DaemonResult<DaemonState> {
    match startup_inner(&config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // A daemon is already running; those files are its, not ours.
            if !matches!(e, DaemonError::LockFailed(_)) {
                cleanup_on_failure(&config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> DaemonResult<DaemonState> {
    std::fs::create_dir_all(&config.state_dir)?;

    let lock_file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(DaemonError::LockFailed)?;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let (disabled, history) = match &config.db_path {
        Some(path) => {
            let db = Db::open(path)?;
            (Some(DisabledRegistry::new(db.clone())), Some(HistoryStore::new(db)))
        }
        None => {
            info!("persistence disabled: history and disabled-job operations will fail");
            (None, None)
        }
    };

    let bus = EventBus::new();
    let supervisor =
        Arc::new(Supervisor::new(bus, Arc::new(UnixProcessRunner), disabled, history, config.tail_capacity));

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| DaemonError::BindFailed(config.socket_path.clone(), e))?;

    info!(socket = %config.socket_path.display(), "daemon started");
    Ok(DaemonState { config: config.clone(), lock_file, supervisor, listener: Some(listener) })
}

impl DaemonState {
    /// Interrupt every live instance, wait for them to terminate, then
    /// remove the socket and lock files. The lock itself is released when
    /// `lock_file` drops.
    pub async fn shutdown(&self) {
        info!("shutting down daemon");
        self.supervisor.shutdown().await;

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!(error = %e, "failed to remove socket file");
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!(error = %e, "failed to remove lock file");
            }
        }
        info!("daemon shutdown complete");
    }
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
