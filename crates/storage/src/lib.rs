// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! taro-storage: SQLite-backed history and disabled-job persistence.

pub mod db;
pub mod disabled;
pub mod error;
pub mod history;
pub mod schema;

pub use db::Db;
pub use disabled::{DisabledRecord, DisabledRegistry, PatternKind};
pub use error::{StorageError, StorageResult};
pub use history::{HistoryQuery, HistoryRecord, HistoryStore, TerminalClass};
pub use schema::CURRENT_SCHEMA_VERSION;
