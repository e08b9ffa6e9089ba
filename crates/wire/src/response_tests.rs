// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn response_tag_is_snake_case_op() {
    let json = serde_json::to_value(Response::Timeout).unwrap();
    assert_eq!(json["op"], "timeout");
}

#[test]
fn command_error_distinguishes_user_error_from_persistence_required() {
    let user = CommandError::UserError { message: "no such instance".to_string() };
    let persistence = CommandError::PersistenceRequired;
    let user_json = serde_json::to_value(&user).unwrap();
    let persistence_json = serde_json::to_value(&persistence).unwrap();
    assert_eq!(user_json["kind"], "user_error");
    assert_eq!(persistence_json["kind"], "persistence_required");
}

#[test]
fn history_record_dto_round_trips_through_json() {
    let record = HistoryRecordDto {
        instance_id: InstanceId::from("nightly-build#1"),
        job_id: "nightly-build".to_string(),
        command: "echo".to_string(),
        created_at: 10,
        terminated_at: 20,
        state: ExecutionState::Completed,
        exit_code: Some(0),
        error: None,
        tail: "hi\n".to_string(),
    };
    let json = serde_json::to_string(&record).unwrap();
    let decoded: HistoryRecordDto = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, record);
}
