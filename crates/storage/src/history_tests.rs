// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::db::Db;
use taro_core::{Clock, FakeClock, InstanceIdGen, JobSpec};

fn completed_instance(job_id: &str) -> JobInstance {
    let clock = FakeClock::new();
    let spec = JobSpec::new(job_id, "echo", vec!["hi".to_string()]);
    let gen = InstanceIdGen::new();
    let mut instance = JobInstance::new(gen.next(&spec.job_id), &spec, &clock);
    instance.state = ExecutionState::Completed;
    instance.state_entered_at.insert(ExecutionState::Completed, clock.epoch_ms());
    instance.exit_code = Some(0);
    instance
}

#[test]
fn record_then_get_round_trips_fields() {
    let db = Db::open_in_memory().unwrap();
    let store = HistoryStore::new(db);
    let instance = completed_instance("build");
    store.record(&instance, "hi\n").unwrap();

    let record = store.get(instance.instance_id.as_str()).unwrap().unwrap();
    assert_eq!(record.job_id, "build");
    assert_eq!(record.command, "echo");
    assert_eq!(record.state, "completed");
    assert_eq!(record.exit_code, Some(0));
    assert_eq!(record.tail_text().unwrap(), "hi\n");
}

#[test]
fn record_is_at_most_once_per_instance() {
    let db = Db::open_in_memory().unwrap();
    let store = HistoryStore::new(db);
    let instance = completed_instance("build");
    store.record(&instance, "hi\n").unwrap();
    store.record(&instance, "hi\n").unwrap();

    let rows = store.query(&HistoryQuery { job_id: Some("build".into()), ..Default::default() }).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn query_filters_by_job_id() {
    let db = Db::open_in_memory().unwrap();
    let store = HistoryStore::new(db);
    store.record(&completed_instance("build"), "").unwrap();
    store.record(&completed_instance("deploy"), "").unwrap();

    let rows = store.query(&HistoryQuery { job_id: Some("deploy".into()), ..Default::default() }).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].job_id, "deploy");
}

#[test]
fn query_filters_by_terminal_class() {
    let db = Db::open_in_memory().unwrap();
    let store = HistoryStore::new(db);
    let mut failed = completed_instance("build");
    failed.state = ExecutionState::Failed;
    failed.error = Some("exit code 1".into());
    store.record(&failed, "").unwrap();
    store.record(&completed_instance("deploy"), "").unwrap();

    let failures =
        store.query(&HistoryQuery { terminal_class: Some(TerminalClass::Failure), ..Default::default() }).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].job_id, "build");

    let successes =
        store.query(&HistoryQuery { terminal_class: Some(TerminalClass::Success), ..Default::default() }).unwrap();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].job_id, "deploy");
}

#[test]
fn empty_tail_round_trips_to_empty_string() {
    let db = Db::open_in_memory().unwrap();
    let store = HistoryStore::new(db);
    let instance = completed_instance("bypass");
    store.record(&instance, "").unwrap();
    let record = store.get(instance.instance_id.as_str()).unwrap().unwrap();
    assert_eq!(record.tail_text().unwrap(), "");
}
