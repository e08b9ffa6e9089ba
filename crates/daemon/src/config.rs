// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: paths, tail capacity, persistence toggle.

use crate::error::{DaemonError, DaemonResult};
use std::path::PathBuf;

/// Resolve the state directory: `TARO_STATE_DIR` > `XDG_STATE_HOME/taro` >
/// `~/.local/state/taro`.
pub fn state_dir() -> DaemonResult<PathBuf> {
    if let Ok(dir) = std::env::var("TARO_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("taro"));
    }
    let home = std::env::var("HOME").map_err(|_| DaemonError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/taro"))
}

/// Daemon configuration (spec.md §4.12, §6 persisted-state layout).
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    /// None disables persistence: history/disabled-job operations then fail
    /// with `PersistenceRequired` (spec.md §4.6).
    pub db_path: Option<PathBuf>,
    pub tail_capacity: usize,
}

impl Config {
    /// Load configuration for the user-level daemon. One daemon serves a
    /// single host; there is no per-project instance.
    ///
    /// Persistence (history + disabled-job storage) can be turned off with
    /// `TARO_NO_PERSIST=1`, in which case `history`/`disable`/`enable`/
    /// `list-disabled` fail with `PersistenceRequired` (spec.md §4.6, §4.9,
    /// exit code 3).
    pub fn load() -> DaemonResult<Self> {
        let state_dir = state_dir()?;
        let no_persist = std::env::var("TARO_NO_PERSIST").is_ok_and(|v| v == "1");
        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            db_path: if no_persist { None } else { Some(state_dir.join("taro.db")) },
            tail_capacity: taro_core::DEFAULT_CAPACITY,
            state_dir,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
