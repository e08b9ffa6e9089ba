// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed JSON framing for the local IPC socket (spec.md §4.12:
//! "4-byte length prefix (big-endian) + JSON payload").

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum accepted message size, guarding against a malformed length
/// prefix causing an unbounded allocation.
pub const MAX_MESSAGE_BYTES: u32 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("message of {0} bytes exceeds the {MAX_MESSAGE_BYTES}-byte limit")]
    MessageTooLarge(u32),

    #[error("json encode/decode error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Serialize `value` to JSON with no length prefix.
pub fn encode<T: Serialize>(value: &T) -> ProtocolResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize a JSON payload with no length prefix.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ProtocolResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write `payload` prefixed with its big-endian u32 length.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> ProtocolResult<()> {
    let len = u32::try_from(payload.len()).map_err(|_| ProtocolError::MessageTooLarge(u32::MAX))?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message, returning its raw payload bytes.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> ProtocolResult<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::MessageTooLarge(len));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Encode `value` and write it length-prefixed.
pub async fn write_framed<W: AsyncWrite + Unpin, T: Serialize>(writer: &mut W, value: &T) -> ProtocolResult<()> {
    write_message(writer, &encode(value)?).await
}

/// Read one length-prefixed message and decode it.
pub async fn read_framed<R: AsyncRead + Unpin, T: DeserializeOwned>(reader: &mut R) -> ProtocolResult<T> {
    decode(&read_message(reader).await?)
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
