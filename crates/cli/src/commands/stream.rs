// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::{ClientError, DaemonClient};
use crate::exit_error::ExitError;
use taro_daemon::Config;
use taro_wire::{Request, Response};

pub async fn listen(config: &Config) -> anyhow::Result<i32> {
    let client = connect(config).await?;
    let result = client
        .send_streaming(&Request::Listen, |response| {
            if let Response::Event(event) = response {
                println!("{}", event.log_summary());
            }
            true
        })
        .await;
    match result {
        Ok(()) => Ok(0),
        Err(e) if matches!(e, ClientError::Protocol(taro_wire::ProtocolError::Io(_))) => Ok(0),
        Err(e) => Err(super::job::unreachable_to_exit(e)),
    }
}

pub async fn tail(config: &Config, instance: &str, follow: bool) -> anyhow::Result<i32> {
    let client = connect(config).await?;
    let instance_id = taro_core::InstanceId::from(instance);
    let mut saw_error = None;
    let result = client
        .send_streaming(&Request::Tail { instance: instance_id, follow }, |response| {
            match response {
                Response::Tail { lines } => {
                    for line in &lines {
                        println!("[{}] {}", line.stream, line.text);
                    }
                    true
                }
                Response::Error(e) => {
                    saw_error = Some(e);
                    false
                }
                _ => true,
            }
        })
        .await;
    if let Some(e) = saw_error {
        return Err(super::job::command_error_to_exit(e));
    }
    match result {
        Ok(()) => Ok(0),
        Err(e) if matches!(e, ClientError::Protocol(taro_wire::ProtocolError::Io(_))) => Ok(0),
        Err(e) => Err(super::job::unreachable_to_exit(e)),
    }
}

async fn connect(config: &Config) -> anyhow::Result<DaemonClient> {
    DaemonClient::connect_or_start(config).await.map_err(|e| {
        if e.is_unreachable() {
            anyhow::Error::new(ExitError::new(2, e.to_string()))
        } else {
            anyhow::anyhow!(e)
        }
    })
}
