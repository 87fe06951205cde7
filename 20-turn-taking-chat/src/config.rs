use std::time::Duration;

use crate::message::Handle;

/// Settings fixed at startup and shared by every session of the process.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub handle: Handle,
    pub read_timeout: Option<Duration>,
}

impl ChatConfig {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            read_timeout: None,
        }
    }

    pub fn with_read_timeout(mut self, limit: Option<Duration>) -> Self {
        self.read_timeout = limit;
        self
    }
}
