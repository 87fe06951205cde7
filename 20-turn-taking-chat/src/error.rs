use std::{io, time::Duration};

use thiserror::Error;

/// Errors that end a single chat session.
///
/// None of these are fatal to the host process: the listener logs them,
/// closes the stream and goes back to accepting connections.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The peer vanished mid-frame, reset the connection, or a write failed.
    #[error("connection lost: {0}")]
    ConnectionLost(#[source] io::Error),

    /// The peer announced a frame larger than this side accepts.
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },

    /// No data arrived from the peer within the configured read timeout.
    #[error("peer sent nothing for {0:?}")]
    Timeout(Duration),

    /// Reading the local console or writing to it failed.
    #[error("console i/o failed: {0}")]
    Console(#[source] io::Error),
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;
