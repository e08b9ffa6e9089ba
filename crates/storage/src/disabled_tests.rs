// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::db::Db;

fn registry() -> DisabledRegistry {
    DisabledRegistry::new(Db::open_in_memory().unwrap())
}

#[test]
fn exact_pattern_matches_only_literal_job_id() {
    let registry = registry();
    registry.disable(&["nightly-build".to_string()], PatternKind::Exact, Some("alice"), 0).unwrap();
    assert!(registry.is_disabled("nightly-build").unwrap());
    assert!(!registry.is_disabled("nightly-build-2").unwrap());
}

#[test]
fn regex_pattern_requires_full_match() {
    let registry = registry();
    registry.disable(&["nightly-.*".to_string()], PatternKind::Regex, None, 0).unwrap();
    assert!(registry.is_disabled("nightly-build").unwrap());
    assert!(!registry.is_disabled("pre-nightly-build").unwrap());
}

#[test]
fn invalid_regex_is_rejected_at_disable_time() {
    let registry = registry();
    let err = registry.disable(&["(unclosed".to_string()], PatternKind::Regex, None, 0).unwrap_err();
    assert!(matches!(err, StorageError::InvalidPattern { .. }));
}

#[test]
fn enable_removes_pattern_and_is_disabled_becomes_false() {
    let registry = registry();
    registry.disable(&["jobA".to_string()], PatternKind::Exact, None, 0).unwrap();
    assert!(registry.is_disabled("jobA").unwrap());
    let removed = registry.enable(&["jobA".to_string()]).unwrap();
    assert_eq!(removed, 1);
    assert!(!registry.is_disabled("jobA").unwrap());
}

#[test]
fn list_returns_all_records() {
    let registry = registry();
    registry.disable(&["a".to_string(), "b".to_string()], PatternKind::Exact, Some("bob"), 5).unwrap();
    let records = registry.list().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.by.as_deref() == Some("bob")));
}
