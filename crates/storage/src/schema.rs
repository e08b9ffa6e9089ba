// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forward-only schema migration (spec.md §6: "a single embedded relational
//! file" with a `schema_version` row).

use crate::error::StorageResult;
use rusqlite::Connection;

pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Bring a freshly-opened connection up to [`CURRENT_SCHEMA_VERSION`].
///
/// Migrations only ever add: there is no downgrade path, matching spec.md's
/// forward-only migration requirement.
pub fn migrate(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
    )?;
    let version: i64 = conn
        .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| {
            row.get::<_, String>(0)
        })
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS history (
                instance_id TEXT PRIMARY KEY,
                job_id TEXT NOT NULL,
                command TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                terminated_at INTEGER NOT NULL,
                state TEXT NOT NULL,
                exit_code INTEGER,
                error TEXT,
                tail BLOB
            );
            CREATE INDEX IF NOT EXISTS history_job_id_idx ON history(job_id);
            CREATE INDEX IF NOT EXISTS history_terminated_at_idx ON history(terminated_at);

            CREATE TABLE IF NOT EXISTS disabled (
                pattern TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                at INTEGER NOT NULL,
                by TEXT
            );",
        )?;
    }

    conn.execute(
        "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        rusqlite::params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
