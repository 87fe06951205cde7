//! Two-party, turn-taking text chat over a single TCP connection.
//!
//! One process hosts, the other connects. After exchanging display handles
//! the parties alternate single messages until either side quits or the
//! connection drops. The host then goes back to waiting for the next caller.
//!
//! - [`cli`] parses the command line for host and client modes.
//! - [`config`] holds the handle and timeout chosen at startup.
//! - [`message`] defines the validated [`message::Handle`] and
//!   [`message::Message`] types and the protocol limits.
//! - [`frame`] is the length-prefixed wire format.
//! - [`handshake`] exchanges handles in a fixed order.
//! - [`console`] reads operator input and writes the chat transcript.
//! - [`session`] is the turn-taking state machine.
//! - [`host`] accepts connections sequentially and drives each session.
//! - [`client`] connects to a host and runs a single session.

pub mod cli;
pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod frame;
pub mod handshake;
pub mod host;
pub mod message;
pub mod session;
