use std::sync::Arc;

/// How one launch-daemons pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Daemons were spawned (and confirmed, if the backend polls).
    Launched,
    /// Nothing needed spawning: debugger daemons, dry runs, or no new daemons.
    Skipped,
    /// The pass escalated the job to the failure state.
    Failed,
}

impl LaunchOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            LaunchOutcome::Launched => "launched",
            LaunchOutcome::Skipped => "skipped",
            LaunchOutcome::Failed => "failed",
        }
    }
}

/// Launch metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record daemons handed to the backend by one launch pass.
    ///
    /// # Arguments
    /// - `backend`: Spawn backend name
    /// - `count`: Number of successful spawn calls
    fn record_daemons_spawned(&self, backend: &str, count: u64);
    /// Record the end of a launch pass.
    ///
    /// # Arguments
    /// - `backend`: Spawn backend name
    /// - `outcome`: How the pass ended
    /// - `duration_ms`: Time from entering the launch state to the outcome, in milliseconds
    fn record_launch_completed(&self, backend: &str, outcome: LaunchOutcome, duration_ms: u64);
    /// Record a backend-level error (connect, spawn, poll).
    ///
    /// Separate from launch failures: a single failed pass may record several of these.
    fn record_backend_error(&self, backend: &str, error_kind: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
