use thiserror::Error;

use crate::DataType;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("bad parameter: {0}")]
    BadParam(&'static str),

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("data type not supported: {0}")]
    NotSupported(DataType),

    #[error("out of resource: unable to reserve {0} bytes")]
    OutOfResource(usize),

    #[error("read past end of buffer: requested {requested} bytes, {available} available")]
    ReadPastEnd { requested: usize, available: usize },
}

pub type CodecResult<T> = Result<T, CodecError>;
