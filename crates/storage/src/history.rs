// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only store of terminated instances (spec.md §4.9).

use crate::db::Db;
use crate::error::StorageResult;
use rusqlite::{params, OptionalExtension};
use taro_core::{ExecutionState, JobInstance};

/// One terminated instance, as persisted (spec.md §6 `history` table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub instance_id: String,
    pub job_id: String,
    pub command: String,
    pub created_at: i64,
    pub terminated_at: i64,
    pub state: String,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
    /// zstd-compressed tail snapshot (newline-joined lines), or empty when
    /// output capture was bypassed.
    pub tail: Vec<u8>,
}

impl HistoryRecord {
    /// Decompress [`Self::tail`] back into newline-joined text.
    pub fn tail_text(&self) -> StorageResult<String> {
        if self.tail.is_empty() {
            return Ok(String::new());
        }
        let bytes = zstd::decode_all(self.tail.as_slice())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Which terminal-state bucket a query should restrict to (spec.md §4.9:
/// "filtering by ... terminal-state class").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalClass {
    Success,
    Failure,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub job_id: Option<String>,
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub terminal_class: Option<TerminalClass>,
}

#[derive(Clone)]
pub struct HistoryStore {
    db: Db,
}

impl HistoryStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Record a terminated instance. Called only after `instance.is_terminal()`
    /// (spec.md §8 invariant 3: at most one record per instance).
    pub fn record(&self, instance: &JobInstance, tail_text: &str) -> StorageResult<()> {
        let tail = if tail_text.is_empty() { Vec::new() } else { zstd::encode_all(tail_text.as_bytes(), 0)? };
        let terminated_at = instance.entered_at(instance.state).unwrap_or(instance.created_at_epoch_ms);
        self.db.with(|conn| {
            conn.execute(
                "INSERT INTO history
                    (instance_id, job_id, command, created_at, terminated_at, state, exit_code, error, tail)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(instance_id) DO NOTHING",
                params![
                    instance.instance_id.as_str(),
                    instance.job_id.as_str(),
                    instance.command,
                    instance.created_at_epoch_ms as i64,
                    terminated_at as i64,
                    instance.state.to_string(),
                    instance.exit_code,
                    instance.error,
                    tail,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get(&self, instance_id: &str) -> StorageResult<Option<HistoryRecord>> {
        self.db.with(|conn| {
            conn.query_row(
                "SELECT instance_id, job_id, command, created_at, terminated_at, state, exit_code, error, tail
                 FROM history WHERE instance_id = ?1",
                params![instance_id],
                row_to_record,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn query(&self, query: &HistoryQuery) -> StorageResult<Vec<HistoryRecord>> {
        self.db.with(|conn| {
            let mut sql = String::from(
                "SELECT instance_id, job_id, command, created_at, terminated_at, state, exit_code, error, tail
                 FROM history WHERE 1 = 1",
            );
            if query.job_id.is_some() {
                sql.push_str(" AND job_id = :job_id");
            }
            if query.since.is_some() {
                sql.push_str(" AND terminated_at >= :since");
            }
            if query.until.is_some() {
                sql.push_str(" AND terminated_at <= :until");
            }
            match query.terminal_class {
                Some(TerminalClass::Success) => sql.push_str(" AND state = 'completed'"),
                Some(TerminalClass::Failure) => sql.push_str(" AND state IN ('interrupted', 'failed')"),
                None => {}
            }
            sql.push_str(" ORDER BY terminated_at ASC");

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = Vec::new();
            let mut named = Vec::new();
            if let Some(job_id) = &query.job_id {
                named.push((":job_id", job_id as &dyn rusqlite::ToSql));
            }
            if let Some(since) = &query.since {
                named.push((":since", since as &dyn rusqlite::ToSql));
            }
            if let Some(until) = &query.until {
                named.push((":until", until as &dyn rusqlite::ToSql));
            }
            let mut mapped = stmt.query_map(named.as_slice(), row_to_record)?;
            while let Some(row) = mapped.next().transpose()? {
                rows.push(row);
            }
            Ok(rows)
        })
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        instance_id: row.get(0)?,
        job_id: row.get(1)?,
        command: row.get(2)?,
        created_at: row.get(3)?,
        terminated_at: row.get(4)?,
        state: row.get(5)?,
        exit_code: row.get(6)?,
        error: row.get(7)?,
        tail: row.get(8)?,
    })
}

/// Whether a state string corresponds to one of the two failure-bearing
/// terminals (spec.md §4.1).
pub fn is_failure_state(state: &str) -> bool {
    state == ExecutionState::Interrupted.to_string() || state == ExecutionState::Failed.to_string()
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
