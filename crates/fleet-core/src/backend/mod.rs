//! Spawn primitives a resource-manager backend must provide.
mod error;
pub use error::BackendError;

use async_trait::async_trait;

use fleet_model::Env;

/// Opaque handle for one spawn call, owned by the launch session until polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnHandle {
    id: u64,
    launch_id: i32,
}

impl SpawnHandle {
    pub fn new(id: u64, launch_id: i32) -> Self {
        Self { id, launch_id }
    }

    /// Backend-assigned identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Launch target the spawn was issued against.
    pub fn launch_id(&self) -> i32 {
        self.launch_id
    }
}

/// Result of confirming a spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnStatus {
    Started,
    /// The backend reported a non-zero local status for the spawned daemon.
    Failed { code: i32 },
}

/// Backend able to start one process on a remote node.
///
/// `spawn` returns as soon as the backend accepted the request. Backends whose acceptance does not
/// prove the process started return `true` from [`SpawnBackend::requires_poll`]; the launcher then
/// confirms every handle through [`SpawnBackend::poll`] in a later step.
#[async_trait]
pub trait SpawnBackend: Send + Sync + 'static {
    /// Short backend name used in logs, metrics and the daemon command line.
    fn name(&self) -> &'static str;

    /// Whether spawns must be confirmed by polling.
    fn requires_poll(&self) -> bool {
        false
    }

    /// Establish the backend session. May fail transiently; the caller retries.
    async fn connect(&self) -> Result<(), BackendError>;

    /// Start `argv` with exactly `env` on the node identified by `launch_id`.
    async fn spawn(
        &self,
        argv: &[String],
        env: &Env,
        launch_id: i32,
    ) -> Result<SpawnHandle, BackendError>;

    /// Wait for the outcome of a previous spawn.
    async fn poll(&self, handle: &SpawnHandle) -> Result<SpawnStatus, BackendError>;

    /// Close the backend session.
    async fn disconnect(&self) -> Result<(), BackendError>;
}
