// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted admission filter (spec.md §4.6).

use crate::db::Db;
use crate::error::{StorageError, StorageResult};
use regex::Regex;
use rusqlite::params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Exact,
    Regex,
}

impl PatternKind {
    fn as_str(self) -> &'static str {
        match self {
            PatternKind::Exact => "exact",
            PatternKind::Regex => "regex",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "regex" => PatternKind::Regex,
            _ => PatternKind::Exact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledRecord {
    pub pattern: String,
    pub kind: PatternKind,
    pub at: i64,
    pub by: Option<String>,
}

#[derive(Clone)]
pub struct DisabledRegistry {
    db: Db,
}

impl DisabledRegistry {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Add patterns to the registry. `kind` applies to every pattern in the
    /// batch (the CLI's `-regex` flag is all-or-nothing per invocation).
    pub fn disable(&self, patterns: &[String], kind: PatternKind, by: Option<&str>, at: i64) -> StorageResult<()> {
        if kind == PatternKind::Regex {
            for pattern in patterns {
                Regex::new(pattern)
                    .map_err(|e| StorageError::InvalidPattern { pattern: pattern.clone(), source: e })?;
            }
        }
        self.db.with(|conn| {
            for pattern in patterns {
                conn.execute(
                    "INSERT INTO disabled (pattern, kind, at, by) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(pattern) DO UPDATE SET kind = excluded.kind, at = excluded.at, by = excluded.by",
                    params![pattern, kind.as_str(), at, by],
                )?;
            }
            Ok(())
        })
    }

    pub fn enable(&self, patterns: &[String]) -> StorageResult<usize> {
        self.db.with(|conn| {
            let mut removed = 0;
            for pattern in patterns {
                removed += conn.execute("DELETE FROM disabled WHERE pattern = ?1", params![pattern])?;
            }
            Ok(removed)
        })
    }

    pub fn list(&self) -> StorageResult<Vec<DisabledRecord>> {
        self.db.with(|conn| {
            let mut stmt = conn.prepare("SELECT pattern, kind, at, by FROM disabled ORDER BY pattern ASC")?;
            let mut rows = Vec::new();
            let mut mapped = stmt.query_map([], |row| {
                Ok(DisabledRecord {
                    pattern: row.get(0)?,
                    kind: PatternKind::from_str(&row.get::<_, String>(1)?),
                    at: row.get(2)?,
                    by: row.get(3)?,
                })
            })?;
            while let Some(row) = mapped.next().transpose()? {
                rows.push(row);
            }
            Ok(rows)
        })
    }

    /// Whether `job_id` matches any stored pattern — exact equality or a
    /// full regex match (spec.md §4.6: "full-match against JobID").
    pub fn is_disabled(&self, job_id: &str) -> StorageResult<bool> {
        let records = self.list()?;
        for record in &records {
            let matches = match record.kind {
                PatternKind::Exact => record.pattern == job_id,
                PatternKind::Regex => {
                    Regex::new(&format!("^(?:{})$", record.pattern)).map(|re| re.is_match(job_id)).unwrap_or(false)
                }
            };
            if matches {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
#[path = "disabled_tests.rs"]
mod tests;
