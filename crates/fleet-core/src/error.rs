use thiserror::Error;

use fleet_codec::CodecError;
use fleet_model::ModelError;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("no launch module available: {0}")]
    NoModule(String),

    #[error("backend '{backend}' busy: connect failed after {attempts} attempts")]
    ResourceBusy {
        backend: &'static str,
        attempts: u32,
    },

    #[error("no launch target id for node {node}")]
    MissingLaunchTarget { node: String },

    #[error("no daemon assigned to node {node}")]
    MissingDaemon { node: String },

    #[error("failed to spawn '{program}' on node {node} (launch id {launch_id}): {source}")]
    Spawn {
        program: String,
        node: String,
        launch_id: i32,
        #[source]
        source: BackendError,
    },

    #[error("failed to poll for daemon on node {node} (launch id {launch_id}): {source}")]
    Poll {
        node: String,
        launch_id: i32,
        #[source]
        source: BackendError,
    },

    #[error("daemon on node {node} (launch id {launch_id}) failed to start, error code = {code}")]
    SpawnFailed {
        node: String,
        launch_id: i32,
        code: i32,
    },

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("daemon comm error: {0}")]
    Comm(String),

    #[error("activation queue closed: {0}")]
    Queue(String),
}

impl CoreError {
    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "not_found",
            CoreError::NoModule(_) => "no_module",
            CoreError::ResourceBusy { .. } => "resource_busy",
            CoreError::MissingLaunchTarget { .. } => "missing_launch_target",
            CoreError::MissingDaemon { .. } => "missing_daemon",
            CoreError::Spawn { .. } => "spawn_failed",
            CoreError::Poll { .. } => "poll_failed",
            CoreError::SpawnFailed { .. } => "spawn_reported_failure",
            CoreError::Backend(_) => "backend",
            CoreError::Codec(_) => "codec",
            CoreError::Model(_) => "model",
            CoreError::Comm(_) => "comm",
            CoreError::Queue(_) => "queue",
        }
    }
}
