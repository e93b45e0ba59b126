use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown job state: {0}")]
    UnknownState(String),

    #[error("invalid process name: {0}")]
    InvalidName(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
