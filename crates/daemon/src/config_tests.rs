// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn state_dir_honors_env_override() {
    std::env::set_var("TARO_STATE_DIR", "/tmp/taro-explicit");
    let dir = state_dir().unwrap();
    std::env::remove_var("TARO_STATE_DIR");
    assert_eq!(dir, std::path::PathBuf::from("/tmp/taro-explicit"));
}

#[test]
#[serial]
fn config_load_derives_paths_under_state_dir() {
    std::env::set_var("TARO_STATE_DIR", "/tmp/taro-config-test");
    let config = Config::load().unwrap();
    std::env::remove_var("TARO_STATE_DIR");
    assert_eq!(config.socket_path, std::path::PathBuf::from("/tmp/taro-config-test/daemon.sock"));
    assert_eq!(config.lock_path, std::path::PathBuf::from("/tmp/taro-config-test/daemon.pid"));
    assert_eq!(config.db_path, Some(std::path::PathBuf::from("/tmp/taro-config-test/taro.db")));
}

#[test]
#[serial]
fn config_load_honors_no_persist_env_var() {
    std::env::set_var("TARO_STATE_DIR", "/tmp/taro-no-persist-test");
    std::env::set_var("TARO_NO_PERSIST", "1");
    let config = Config::load().unwrap();
    std::env::remove_var("TARO_STATE_DIR");
    std::env::remove_var("TARO_NO_PERSIST");
    assert_eq!(config.db_path, None);
}
