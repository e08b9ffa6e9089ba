// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn json_format_renders_without_calling_the_text_closure() {
    let mut called = false;
    format_or_json(OutputFormat::Json, &json!({"ok": true}), || called = true).unwrap();
    assert!(!called);
}

#[test]
fn text_format_calls_the_text_closure() {
    let mut called = false;
    format_or_json(OutputFormat::Text, &json!({"ok": true}), || called = true).unwrap();
    assert!(called);
}
