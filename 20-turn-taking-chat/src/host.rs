use std::{future::Future, net::SocketAddr};

use anyhow::Result;
use tokio::{
    io::{AsyncBufRead, AsyncWrite},
    net::{TcpListener, TcpStream},
    select,
};
use tracing::{info, warn};

use crate::{
    config::ChatConfig,
    console,
    error::ChatError,
    handshake,
    session::{Session, SessionEnd, SessionOutcome},
};

/// Accepts one connection at a time and drives it to completion before
/// accepting the next.
pub struct Host {
    listener: TcpListener,
    config: ChatConfig,
}

impl Host {
    pub fn new(listener: TcpListener, config: ChatConfig) -> Self {
        Self { listener, config }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves sessions until `shutdown` resolves. Shutdown is observed both
    /// while waiting for a connection and in the middle of a session; an
    /// interrupted session's stream is closed when it is dropped. The loop
    /// also stops once console input is exhausted.
    pub async fn run_until<I, O, F>(self, input: &mut I, out: &mut O, shutdown: F) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        let Host { listener, config } = self;
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        warn!(error = ?err, "failed to accept connection");
                        continue;
                    }
                },
            };

            console::write_line(out, &format!("received connection on address {peer}")).await?;
            info!(%peer, "connection accepted");

            let served = select! {
                _ = &mut shutdown => {
                    info!(%peer, "shutdown requested during session");
                    break;
                }
                served = serve_connection(stream, &config, input, out) => served,
            };

            match served {
                Ok(outcome) if outcome.end == SessionEnd::InputClosed => {
                    info!(%peer, "console input closed; no longer accepting connections");
                    break;
                }
                Ok(outcome) => info!(
                    %peer,
                    end = ?outcome.end,
                    exchanged = outcome.transcript.len(),
                    "session finished"
                ),
                Err(ChatError::Console(err)) => return Err(err.into()),
                Err(err) => {
                    warn!(%peer, error = %err, "session ended with error");
                    console::write_line(out, "Connection closed").await?;
                }
            }
            console::write_line(out, "Waiting for new connection").await?;
        }

        info!("host shutting down");
        Ok(())
    }

    pub async fn run_until_ctrl_c<I, O>(self, input: &mut I, out: &mut O) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        self.run_until(input, out, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}

async fn serve_connection<I, O>(
    mut stream: TcpStream,
    config: &ChatConfig,
    input: &mut I,
    out: &mut O,
) -> Result<SessionOutcome, ChatError>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let remote = handshake::respond(&mut stream, &config.handle, config.read_timeout).await?;
    info!(remote = %remote, "handshake complete");

    Session::remote_first(stream, config.handle.clone(), remote)
        .with_read_timeout(config.read_timeout)
        .run(input, out)
        .await
}
