// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded ring buffer of recent output lines (spec.md §4.4).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default tail capacity, used unless a supervisor overrides it.
pub const DEFAULT_CAPACITY: usize = 100;

/// Which child stream a [`TailLine`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    Stdout,
    Stderr,
}

/// One captured line of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailLine {
    pub stream: Stream,
    pub text: String,
    pub at_epoch_ms: u64,
}

struct Inner {
    capacity: usize,
    lines: VecDeque<TailLine>,
    /// Count of lines evicted by overflow; internal-only (spec.md §9: no new
    /// event kind for overflow, exposed only as a counter).
    dropped: u64,
    follow_tx: broadcast::Sender<TailLine>,
    closed: bool,
}

/// Single-writer ([`crate::outputs::OutputPump`]-equivalent callers),
/// multi-reader bounded tail of the most recent lines for one instance.
#[derive(Clone)]
pub struct TailBuffer {
    inner: Arc<parking_lot::Mutex<Inner>>,
}

impl TailBuffer {
    pub fn new(capacity: usize) -> Self {
        let (follow_tx, _) = broadcast::channel(capacity.max(16));
        Self {
            inner: Arc::new(parking_lot::Mutex::new(Inner {
                capacity: capacity.max(1),
                lines: VecDeque::with_capacity(capacity.max(1)),
                dropped: 0,
                follow_tx,
                closed: false,
            })),
        }
    }

    /// Append a line, overwriting the oldest on overflow. Never blocks.
    pub fn append(&self, line: TailLine) {
        let mut inner = self.inner.lock();
        if inner.lines.len() == inner.capacity {
            inner.lines.pop_front();
            inner.dropped += 1;
        }
        inner.lines.push_back(line.clone());
        // A `follow()` call with no active receivers returns an error we can
        // ignore: nobody is listening, nothing was lost for them.
        let _ = inner.follow_tx.send(line);
    }

    /// All currently buffered lines, oldest first.
    pub fn snapshot(&self) -> Vec<TailLine> {
        self.inner.lock().lines.iter().cloned().collect()
    }

    pub fn dropped_count(&self) -> u64 {
        self.inner.lock().dropped
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A receiver of lines appended from this point onward. The caller is
    /// responsible for stopping once the owning instance reaches terminal
    /// (signalled via [`TailBuffer::close`]).
    pub fn follow(&self) -> broadcast::Receiver<TailLine> {
        self.inner.lock().follow_tx.subscribe()
    }

    /// Mark the buffer closed: further `follow()` receivers still get lines
    /// already in flight, but callers polling `is_closed()` know to stop.
    pub fn close(&self) {
        self.inner.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

#[cfg(test)]
#[path = "tail_tests.rs"]
mod tests;
