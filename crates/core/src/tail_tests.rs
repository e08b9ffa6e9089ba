// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn line(text: &str) -> TailLine {
    TailLine { stream: Stream::Stdout, text: text.to_string(), at_epoch_ms: 0 }
}

#[test]
fn capacity_n_plus_k_keeps_last_n_in_order() {
    let buf = TailBuffer::new(3);
    for i in 0..5 {
        buf.append(line(&i.to_string()));
    }
    let snapshot = buf.snapshot();
    let texts: Vec<_> = snapshot.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["2", "3", "4"]);
    assert_eq!(buf.dropped_count(), 2);
}

#[test]
fn snapshot_empty_buffer() {
    let buf = TailBuffer::new(10);
    assert!(buf.snapshot().is_empty());
    assert!(buf.is_empty());
}

#[test]
fn follow_receives_lines_appended_after_subscribe() {
    let buf = TailBuffer::new(10);
    buf.append(line("before"));
    let mut rx = buf.follow();
    buf.append(line("after"));
    let received = rx.try_recv().expect("line should be available");
    assert_eq!(received.text, "after");
}

#[test]
fn close_is_observable() {
    let buf = TailBuffer::new(10);
    assert!(!buf.is_closed());
    buf.close();
    assert!(buf.is_closed());
}

#[test]
fn append_never_panics_at_capacity_one() {
    let buf = TailBuffer::new(1);
    buf.append(line("a"));
    buf.append(line("b"));
    assert_eq!(buf.snapshot(), vec![line("b")]);
}
