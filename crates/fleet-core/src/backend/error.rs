use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("spawn rejected: {0}")]
    Spawn(String),

    #[error("poll failed: {0}")]
    Poll(String),

    #[error("poll timed out after {0}ms")]
    Timeout(u64),

    #[error("unknown spawn handle {0}")]
    UnknownHandle(u64),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl BackendError {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Connect(_) => "connect",
            BackendError::Spawn(_) => "spawn",
            BackendError::Poll(_) => "poll",
            BackendError::Timeout(_) => "poll_timeout",
            BackendError::UnknownHandle(_) => "unknown_handle",
            BackendError::Io(_) => "io",
        }
    }
}
