use std::fmt;

use thiserror::Error;

/// Longest chat message, in characters, either side will send.
pub const MAX_LEN: usize = 500;

/// Longest display handle, in characters.
pub const MAX_HANDLE_LEN: usize = 10;

/// Local input that ends the session. Never transmitted.
pub const QUIT: &str = "\\quit";

/// A display name chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("handle cannot be empty")]
    Empty,
    #[error("handle is {0} characters long; the limit is {max}", max = MAX_HANDLE_LEN)]
    TooLong(usize),
}

impl Handle {
    pub fn new(name: impl Into<String>) -> Result<Self, HandleError> {
        let name = name.into();
        match name.chars().count() {
            0 => Err(HandleError::Empty),
            len if len > MAX_HANDLE_LEN => Err(HandleError::TooLong(len)),
            _ => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Handle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Outgoing chat text that is known to fit the protocol bound.
///
/// The framer only accepts this type, so nothing longer than [`MAX_LEN`]
/// characters can reach the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("message cannot be empty")]
    Empty,
    #[error("message is {0} characters long; the limit is {max}", max = MAX_LEN)]
    TooLong(usize),
}

impl Message {
    pub fn new(text: impl Into<String>) -> Result<Self, MessageError> {
        let text = text.into();
        match text.chars().count() {
            0 => Err(MessageError::Empty),
            len if len > MAX_LEN => Err(MessageError::TooLong(len)),
            _ => Ok(Self(text)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
