// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drains a child's stdout/stderr into a [`TailBuffer`] and the [`EventBus`]
//! (spec.md §4.3).

use taro_core::{Clock, Event, EventBus, InstanceId, Stream, TailBuffer, TailLine};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

/// One pump per instance, with two independent readers (spec.md §4.3).
///
/// Dropped output never blocks the child: `TailBuffer::append` is lock-free
/// bounded work, and `EventBus::publish` drops per its subscriber policy
/// rather than waiting.
pub struct OutputPump {
    stdout: JoinHandle<()>,
    stderr: JoinHandle<()>,
}

impl OutputPump {
    pub fn spawn<O, E>(
        instance_id: InstanceId,
        stdout: O,
        stderr: E,
        tail: TailBuffer,
        bus: EventBus,
        clock: impl Clock + 'static,
    ) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        let stdout_handle = tokio::spawn(pump_stream(
            instance_id.clone(),
            stdout,
            Stream::Stdout,
            tail.clone(),
            bus.clone(),
            clock.clone(),
        ));
        let stderr_handle =
            tokio::spawn(pump_stream(instance_id, stderr, Stream::Stderr, tail, bus, clock));
        Self { stdout: stdout_handle, stderr: stderr_handle }
    }

    /// Wait for both readers to observe EOF. The caller must join this
    /// before publishing the instance's terminal `StateChanged` event
    /// (spec.md §8: terminal events follow all output originating before
    /// exit).
    pub async fn drain(self) {
        let _ = self.stdout.await;
        let _ = self.stderr.await;
    }
}

async fn pump_stream<R>(
    instance_id: InstanceId,
    reader: R,
    stream: Stream,
    tail: TailBuffer,
    bus: EventBus,
    clock: impl Clock,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf).trim_end_matches(['\n', '\r']).to_string();
                let at_epoch_ms = clock.epoch_ms();
                tail.append(TailLine { stream, text: text.clone(), at_epoch_ms });
                bus.publish(Event::OutputLine { instance_id: instance_id.clone(), stream, text, at_epoch_ms });
            }
            Err(e) => {
                tracing::warn!(%instance_id, error = %e, ?stream, "output read error, stopping pump");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
