use tokio::sync::mpsc;

use fleet_model::{JobState, Nspace};

use crate::error::CoreError;

/// Request to move a job into a state and run that state's handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub nspace: Nspace,
    pub state: JobState,
    /// Recorded on the job when present; used for failure diagnostics.
    pub reason: Option<String>,
}

impl Activation {
    pub fn new(nspace: Nspace, state: JobState) -> Self {
        Self {
            nspace,
            state,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Cloneable handle that enqueues activations from any task or thread.
#[derive(Debug, Clone)]
pub struct Activator {
    tx: mpsc::UnboundedSender<Activation>,
}

impl Activator {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Activation>) -> Self {
        Self { tx }
    }

    /// Enqueue `state` for `nspace`.
    pub fn activate(&self, nspace: Nspace, state: JobState) -> Result<(), CoreError> {
        self.send(Activation::new(nspace, state))
    }

    /// Enqueue a prepared activation.
    pub fn send(&self, activation: Activation) -> Result<(), CoreError> {
        self.tx
            .send(activation)
            .map_err(|e| CoreError::Queue(format!("dropped activation for {}", e.0.nspace)))
    }
}
