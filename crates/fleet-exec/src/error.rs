use thiserror::Error;

use fleet_core::{BackendError, CoreError};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid backend configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to deliver signal {signal} to pid {pid}: {source}")]
    Signal {
        pid: u32,
        signal: i32,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ExecError> for BackendError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::Io(io) => BackendError::Io(io),
            other => BackendError::Spawn(other.to_string()),
        }
    }
}

impl From<ExecError> for CoreError {
    fn from(e: ExecError) -> Self {
        CoreError::Comm(e.to_string())
    }
}
