use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log format: {0} (expected: text|json|journald)")]
    InvalidFormat(String),

    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("invalid timezone: {0} (expected: utc|local)")]
    InvalidTimeZone(String),

    #[error("journald is not supported on this platform")]
    JournaldNotSupported,

    #[error("failed to connect to journald: {0}")]
    JournaldInitFailed(String),

    #[error("a global logger is already installed")]
    AlreadyInitialized,
}

pub type LoggerResult<T> = Result<T, LoggerError>;
