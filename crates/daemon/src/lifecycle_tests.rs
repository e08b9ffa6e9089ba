// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn config_in(dir: &std::path::Path) -> Config {
    Config {
        state_dir: dir.to_path_buf(),
        socket_path: dir.join("daemon.sock"),
        lock_path: dir.join("daemon.pid"),
        db_path: None,
        tail_capacity: 10,
    }
}

#[tokio::test]
#[serial]
async fn startup_binds_socket_and_writes_pid() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let state = startup(config).await.unwrap();
    assert!(state.config.socket_path.exists());
    let pid_text = std::fs::read_to_string(&state.config.lock_path).unwrap();
    assert_eq!(pid_text.trim().parse::<u32>().unwrap(), std::process::id());
    state.shutdown().await;
}

#[tokio::test]
#[serial]
async fn second_startup_fails_to_acquire_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let first = startup(config_in(dir.path())).await.unwrap();

    let err = startup(config_in(dir.path())).await.unwrap_err();
    assert!(matches!(err, DaemonError::LockFailed(_)));
    // The already-running daemon's files must survive a failed second startup.
    assert!(first.config.lock_path.exists());

    first.shutdown().await;
}

#[tokio::test]
#[serial]
async fn shutdown_removes_socket_and_lock_files() {
    let dir = tempfile::tempdir().unwrap();
    let state = startup(config_in(dir.path())).await.unwrap();
    let socket_path = state.config.socket_path.clone();
    let lock_path = state.config.lock_path.clone();
    state.shutdown().await;
    assert!(!socket_path.exists());
    assert!(!lock_path.exists());
}
