use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufRead, AsyncWrite},
    net::TcpStream,
};
use tracing::info;

use crate::{
    config::ChatConfig,
    console, handshake,
    session::{Session, SessionOutcome},
};

/// Connects to a host, exchanges handles and runs one local-first session.
pub async fn run<I, O>(
    address: &str,
    port: u16,
    config: &ChatConfig,
    input: &mut I,
    out: &mut O,
) -> Result<SessionOutcome>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut stream = TcpStream::connect((address, port))
        .await
        .with_context(|| format!("failed to connect to {address}:{port}"))?;
    let peer = stream.peer_addr().context("connected socket has no peer address")?;
    info!(%peer, "connected");

    let remote = handshake::initiate(&mut stream, &config.handle, config.read_timeout)
        .await
        .context("handshake with host failed")?;
    console::write_line(out, &format!("Connected to {remote} at {peer}")).await?;

    let outcome = Session::local_first(stream, config.handle.clone(), remote)
        .with_read_timeout(config.read_timeout)
        .run(input, out)
        .await?;
    info!(%peer, end = ?outcome.end, "session finished");
    Ok(outcome)
}
