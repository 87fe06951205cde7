//! Length-prefixed framing for handles and chat messages.
//!
//! Every payload travels as `[len: u32 big-endian][len bytes]`. A clean end of
//! stream before a frame starts, or a frame of length zero, means the peer
//! has ended the conversation. Anything else that interrupts a frame is a
//! [`ChatError::ConnectionLost`].

use std::{io, time::Duration};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    error::{ChatError, Result},
    message::{MAX_LEN, Message},
};

/// Largest handle frame a receiver reads.
pub const MAX_HANDLE_FRAME: usize = 1024;

/// Largest message frame a receiver reads: [`MAX_LEN`] characters of UTF-8.
pub const MAX_MESSAGE_FRAME: usize = MAX_LEN * 4;

/// One decoded message, or the peer's end-of-conversation signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Message(String),
    Closed,
}

pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len()).map_err(|_| ChatError::FrameTooLarge {
        len: payload.len(),
        max: u32::MAX as usize,
    })?;

    let mut encoded = Vec::with_capacity(4 + payload.len());
    encoded.extend_from_slice(&len.to_be_bytes());
    encoded.extend_from_slice(payload);
    writer
        .write_all(&encoded)
        .await
        .map_err(ChatError::ConnectionLost)?;
    writer.flush().await.map_err(ChatError::ConnectionLost)
}

/// Reads one frame of at most `max` bytes. `Ok(None)` means the stream ended
/// cleanly on a frame boundary.
pub async fn read_frame<R>(reader: &mut R, max: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        let read = reader
            .read(&mut prefix[filled..])
            .await
            .map_err(ChatError::ConnectionLost)?;
        if read == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(truncated("length prefix"));
        }
        filled += read;
    }

    let len = u32::from_be_bytes(prefix) as usize;
    if len > max {
        return Err(ChatError::FrameTooLarge { len, max });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            truncated("payload")
        } else {
            ChatError::ConnectionLost(err)
        }
    })?;
    Ok(Some(payload))
}

/// [`read_frame`] bounded by an optional timeout.
pub async fn read_frame_within<R>(
    reader: &mut R,
    max: usize,
    limit: Option<Duration>,
) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, read_frame(reader, max))
            .await
            .map_err(|_| ChatError::Timeout(limit))?,
        None => read_frame(reader, max).await,
    }
}

pub async fn write_message<W>(writer: &mut W, message: &Message) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_frame(writer, message.as_str().as_bytes()).await
}

pub async fn read_message<R>(reader: &mut R, limit: Option<Duration>) -> Result<Incoming>
where
    R: AsyncRead + Unpin,
{
    match read_frame_within(reader, MAX_MESSAGE_FRAME, limit).await? {
        Some(payload) if !payload.is_empty() => Ok(Incoming::Message(
            String::from_utf8_lossy(&payload).into_owned(),
        )),
        _ => Ok(Incoming::Closed),
    }
}

fn truncated(part: &str) -> ChatError {
    ChatError::ConnectionLost(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("stream ended inside frame {part}"),
    ))
}
