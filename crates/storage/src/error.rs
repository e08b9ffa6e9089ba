// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the SQLite-backed persistence layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("tail (de)compression failed: {0}")]
    Compression(#[from] std::io::Error),

    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidPattern { pattern: String, #[source] source: regex::Error },

    #[error("failed to open database at {path}: {source}")]
    Open { path: String, #[source] source: rusqlite::Error },
}

pub type StorageResult<T> = Result<T, StorageError>;
