// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared connection handle for [`crate::history::HistoryStore`] and
//! [`crate::disabled::DisabledRegistry`] — the same file backs both
//! (spec.md §5: "DisabledRegistry is serialized through HistoryStore
//! transactions").

use crate::error::{StorageError, StorageResult};
use crate::schema;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct Db(Arc<parking_lot::Mutex<Connection>>);

impl Db {
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| StorageError::Open { path: path.as_ref().display().to_string(), source: e })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::migrate(&conn)?;
        Ok(Self(Arc::new(parking_lot::Mutex::new(conn))))
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::migrate(&conn)?;
        Ok(Self(Arc::new(parking_lot::Mutex::new(conn))))
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&Connection) -> StorageResult<R>) -> StorageResult<R> {
        f(&self.0.lock())
    }
}
