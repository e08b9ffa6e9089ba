// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by daemon startup, the supervisor, and the local listener.

use std::path::PathBuf;
use taro_adapters::ProcessError;
use taro_core::CoreError;
use taro_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, #[source] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("process error: {0}")]
    Process(#[from] ProcessError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DaemonResult<T> = Result<T, DaemonError>;
