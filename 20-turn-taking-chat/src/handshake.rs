//! Handle exchange performed right after a connection is established.
//!
//! The order is fixed, not negotiated: the accepting side reads the peer's
//! handle first and then answers with its own; the connecting side does the
//! reverse. The remote handle is returned unvalidated.

use std::{io, time::Duration};

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::{
    error::{ChatError, Result},
    frame::{MAX_HANDLE_FRAME, read_frame_within, write_frame},
    message::Handle,
};

/// Accepting side: receive the remote handle, then send ours.
pub async fn respond<S>(stream: &mut S, local: &Handle, limit: Option<Duration>) -> Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let remote = receive_handle(stream, limit).await?;
    write_frame(stream, local.as_str().as_bytes()).await?;
    debug!(remote = %remote, "handshake answered");
    Ok(remote)
}

/// Connecting side: send our handle, then receive the remote one.
pub async fn initiate<S>(stream: &mut S, local: &Handle, limit: Option<Duration>) -> Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    write_frame(stream, local.as_str().as_bytes()).await?;
    let remote = receive_handle(stream, limit).await?;
    debug!(remote = %remote, "handshake completed");
    Ok(remote)
}

async fn receive_handle<S>(stream: &mut S, limit: Option<Duration>) -> Result<String>
where
    S: AsyncRead + Unpin,
{
    match read_frame_within(stream, MAX_HANDLE_FRAME, limit).await? {
        Some(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        None => Err(ChatError::ConnectionLost(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed before handshake",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn both_sides_learn_each_others_handle() {
        let (mut host_side, mut client_side) = tokio::io::duplex(1024);
        let alice = Handle::new("alice").unwrap();
        let bob = Handle::new("bob").unwrap();

        let client = tokio::spawn(async move { initiate(&mut client_side, &bob, None).await });
        let seen_by_host = respond(&mut host_side, &alice, None).await.expect("respond");
        let seen_by_client = client.await.unwrap().expect("initiate");

        assert_eq!(seen_by_host, "bob");
        assert_eq!(seen_by_client, "alice");
    }

    #[tokio::test]
    async fn responder_reads_before_it_writes() {
        let (mut host_side, mut client_side) = tokio::io::duplex(1024);
        let alice = Handle::new("alice").unwrap();

        let host = tokio::spawn(async move { respond(&mut host_side, &alice, None).await });

        // Nothing may arrive until the client has spoken.
        let early = read_frame_within(
            &mut client_side,
            MAX_HANDLE_FRAME,
            Some(Duration::from_millis(50)),
        )
        .await;
        assert!(matches!(early, Err(ChatError::Timeout(_))));

        write_frame(&mut client_side, b"bob").await.unwrap();
        let reply = read_frame_within(&mut client_side, MAX_HANDLE_FRAME, None)
            .await
            .unwrap()
            .expect("host handle");
        assert_eq!(reply, b"alice");
        assert_eq!(host.await.unwrap().unwrap(), "bob");
    }

    #[tokio::test]
    async fn remote_handles_are_not_validated() {
        let (mut host_side, mut client_side) = tokio::io::duplex(2048);
        let alice = Handle::new("alice").unwrap();
        let long_name = "x".repeat(MAX_HANDLE_FRAME);
        write_frame(&mut client_side, long_name.as_bytes()).await.unwrap();

        let remote = respond(&mut host_side, &alice, None).await.expect("respond");
        assert_eq!(remote, long_name);
    }

    #[tokio::test]
    async fn closed_stream_fails_the_handshake() {
        let (mut host_side, client_side) = tokio::io::duplex(64);
        drop(client_side);
        let alice = Handle::new("alice").unwrap();

        let err = respond(&mut host_side, &alice, None).await.unwrap_err();
        assert!(matches!(err, ChatError::ConnectionLost(_)));
    }
}
