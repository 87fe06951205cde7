//! Turn-taking state machine for one conversation.
//!
//! A session owns one stream. Receives and sends strictly alternate; the
//! initial state decides who speaks first. Only one party ever holds the
//! turn, so a single task drives both directions without any select.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::{
    console::{self, LocalInput},
    error::Result,
    frame::{Incoming, read_message, write_message},
    message::Handle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingRemote,
    AwaitingLocalInput,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    RemoteClosed,
    LocalQuit,
    InputClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    Received(String),
    Sent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub end: SessionEnd,
    pub transcript: Vec<Exchange>,
}

pub struct Session<S> {
    stream: S,
    local: Handle,
    remote: String,
    state: TurnState,
    read_timeout: Option<Duration>,
    transcript: Vec<Exchange>,
    end: Option<SessionEnd>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Session for the accepting side: the remote party speaks first.
    pub fn remote_first(stream: S, local: Handle, remote: String) -> Self {
        Self::new(stream, local, remote, TurnState::AwaitingRemote)
    }

    /// Session for the connecting side: the local operator speaks first.
    pub fn local_first(stream: S, local: Handle, remote: String) -> Self {
        Self::new(stream, local, remote, TurnState::AwaitingLocalInput)
    }

    fn new(stream: S, local: Handle, remote: String, state: TurnState) -> Self {
        Self {
            stream,
            local,
            remote,
            state,
            read_timeout: None,
            transcript: Vec::new(),
            end: None,
        }
    }

    pub fn with_read_timeout(mut self, limit: Option<Duration>) -> Self {
        self.read_timeout = limit;
        self
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn remote_handle(&self) -> &str {
        &self.remote
    }

    /// Drives the session to `Terminated` and closes the stream.
    ///
    /// On error the stream is dropped (and so closed) with the session.
    pub async fn run<I, O>(mut self, input: &mut I, out: &mut O) -> Result<SessionOutcome>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let end = loop {
            if let Some(end) = self.step(input, out).await? {
                break end;
            }
        };
        debug_assert_eq!(self.state, TurnState::Terminated);

        console::write_line(out, "Connection closed").await?;
        if let Err(error) = self.stream.shutdown().await {
            warn!(?error, "failed to shut down stream cleanly");
        }
        debug!(
            remote = %self.remote,
            ?end,
            exchanged = self.transcript.len(),
            "session terminated"
        );

        Ok(SessionOutcome {
            end,
            transcript: self.transcript,
        })
    }

    /// Performs one transition. Returns why the session ended once it
    /// reaches `Terminated`.
    pub async fn step<I, O>(&mut self, input: &mut I, out: &mut O) -> Result<Option<SessionEnd>>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        match self.state {
            TurnState::AwaitingRemote => {
                match read_message(&mut self.stream, self.read_timeout).await? {
                    Incoming::Closed => Ok(Some(self.terminate(SessionEnd::RemoteClosed))),
                    Incoming::Message(text) => {
                        console::write_line(out, &format!("{}> {}", self.remote, text)).await?;
                        self.transcript.push(Exchange::Received(text));
                        self.state = TurnState::AwaitingLocalInput;
                        Ok(None)
                    }
                }
            }
            TurnState::AwaitingLocalInput => {
                match console::acquire_input(input, out, &self.local).await? {
                    LocalInput::Quit => Ok(Some(self.terminate(SessionEnd::LocalQuit))),
                    LocalInput::Closed => Ok(Some(self.terminate(SessionEnd::InputClosed))),
                    LocalInput::Send(message) => {
                        write_message(&mut self.stream, &message).await?;
                        self.transcript.push(Exchange::Sent(message.into_string()));
                        self.state = TurnState::AwaitingRemote;
                        Ok(None)
                    }
                }
            }
            TurnState::Terminated => Ok(self.end),
        }
    }

    fn terminate(&mut self, end: SessionEnd) -> SessionEnd {
        self.state = TurnState::Terminated;
        self.end = Some(end);
        end
    }
}
