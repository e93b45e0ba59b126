//! Launch module interface: what the rest of the runtime can ask of a daemon launcher.
mod comm;
pub use comm::{DaemonComm, Directive, DirectiveKind};

mod registry;
pub use registry::ModuleRegistry;

use async_trait::async_trait;
use tracing::debug;

use fleet_model::{Job, JobState, Nspace, ProcName};

use crate::{error::CoreError, state::Activator, state::StateMachine};

/// One launch backend, selected at configuration time.
///
/// `terminate_orteds`, `signal_job` and `finalize` are backend capabilities; the rest have
/// shared defaults built on [`LaunchModule::comm`].
#[async_trait]
pub trait LaunchModule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this module can run in the current environment.
    fn available(&self) -> bool {
        true
    }

    /// Channel used to reach running daemons.
    fn comm(&self) -> &dyn DaemonComm;

    /// Start the daemon comm channel and bind this module's state handlers.
    async fn init(&self, machine: &mut StateMachine) -> Result<(), CoreError>;

    /// Name of the launcher process itself: rank 0 of a fresh daemon namespace.
    fn set_hnp_name(&self) -> ProcName {
        ProcName::new(Nspace::generate("fleet", 0), 0)
    }

    /// Kick off the launch of `job`: restarting jobs re-enter at mapping, everything else starts at init.
    fn launch_job(&self, job: &Job, activator: &Activator) -> Result<(), CoreError> {
        let state = if job.flags.restart.is_enabled() {
            JobState::Map
        } else {
            JobState::Init
        };
        debug!(nspace = %job.nspace, state = %state, module = self.name(), "launching job");
        activator.activate(job.nspace.clone(), state)
    }

    /// Order every daemon to exit.
    async fn terminate_orteds(&self) -> Result<(), CoreError>;

    /// Deliver `signal` to every process of `nspace`.
    async fn signal_job(&self, nspace: &Nspace, signal: i32) -> Result<(), CoreError>;

    /// Kill the given processes wherever they run.
    async fn kill_local_procs(&self, procs: &[ProcName]) -> Result<(), CoreError> {
        self.comm().broadcast(Directive::kill(procs)).await
    }

    /// Stop the comm channel and release the backend session. Failures are logged, never returned.
    async fn finalize(&self) -> Result<(), CoreError>;
}
