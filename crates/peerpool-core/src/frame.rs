//! Length-prefixed bincode frames.
//!
//! Wire format: `u32 length prefix (big-endian) + bincode(payload)`.
//! Requests carry `(RequestHeader, ObjectManagerRequest)`, responses carry
//! `ObjectManagerResponse`.

use peerpool_proto::{RpcError, RpcResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Serialize `msg` into a frame payload, checking it against the size limit.
///
/// Fails without touching any stream, so callers can encode before taking
/// a connection.
pub fn encode_frame<T: Serialize>(msg: &T, max_frame_size: usize) -> RpcResult<Vec<u8>> {
    let data = bincode::serialize(msg).map_err(|_| RpcError::Serialization)?;
    if data.is_empty() || data.len() > max_frame_size || data.len() > u32::MAX as usize {
        return Err(RpcError::InvalidFrame);
    }
    Ok(data)
}

/// Write an already encoded payload as one frame.
pub async fn write_encoded<W>(writer: &mut W, data: &[u8]) -> RpcResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u32(data.len() as u32).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Serialize `msg` and write it as one frame.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T, max_frame_size: usize) -> RpcResult<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let data = encode_frame(msg, max_frame_size)?;
    write_encoded(writer, &data).await
}

/// Read one frame and deserialize its payload.
///
/// Zero-length frames and frames above `max_frame_size` are rejected before
/// any payload is read.
pub async fn read_frame<R, T>(reader: &mut R, max_frame_size: usize) -> RpcResult<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let frame_len = reader.read_u32().await? as usize;
    if frame_len == 0 || frame_len > max_frame_size {
        return Err(RpcError::InvalidFrame);
    }

    let mut buf = vec![0u8; frame_len];
    reader.read_exact(&mut buf).await?;

    bincode::deserialize(&buf).map_err(|_| RpcError::Serialization)
}
