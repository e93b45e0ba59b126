use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use fleet_model::{JobState, Nspace};

use crate::{
    backend::SpawnBackend,
    error::CoreError,
    launch::{DaemonLauncher, DiscardSpawns, LaunchDaemons, PollSpawns},
    module::{DaemonComm, Directive, LaunchModule},
    state::StateMachine,
};

/// Launch module driving a [`DaemonLauncher`] and reaching daemons through a [`DaemonComm`].
pub struct PlmModule<B: SpawnBackend> {
    launcher: Arc<DaemonLauncher<B>>,
    comm: Arc<dyn DaemonComm>,
}

impl<B: SpawnBackend> PlmModule<B> {
    pub fn new(launcher: DaemonLauncher<B>, comm: Arc<dyn DaemonComm>) -> Self {
        Self {
            launcher: Arc::new(launcher),
            comm,
        }
    }

    pub fn launcher(&self) -> &Arc<DaemonLauncher<B>> {
        &self.launcher
    }
}

#[async_trait]
impl<B: SpawnBackend> LaunchModule for PlmModule<B> {
    fn name(&self) -> &'static str {
        self.launcher.backend().name()
    }

    fn comm(&self) -> &dyn DaemonComm {
        self.comm.as_ref()
    }

    async fn init(&self, machine: &mut StateMachine) -> Result<(), CoreError> {
        if let Err(e) = self.comm.start().await {
            error!(module = self.name(), error = %e, "daemon comm failed to start");
        }
        machine.set_handler(
            JobState::LaunchDaemons,
            Arc::new(LaunchDaemons(self.launcher.clone())),
        );
        if self.launcher.backend().requires_poll() {
            machine.set_handler(
                JobState::DaemonsLaunched,
                Arc::new(PollSpawns(self.launcher.clone())),
            );
            machine.set_handler(
                JobState::FailedToStart,
                Arc::new(DiscardSpawns(self.launcher.clone())),
            );
        }
        debug!(module = self.name(), "launch module initialized");
        Ok(())
    }

    async fn terminate_orteds(&self) -> Result<(), CoreError> {
        info!(module = self.name(), "ordering daemons to exit");
        self.comm.broadcast(Directive::exit()).await
    }

    async fn signal_job(&self, nspace: &Nspace, signal: i32) -> Result<(), CoreError> {
        debug!(nspace = %nspace, signal, "signalling job");
        self.comm.broadcast(Directive::signal(nspace, signal)).await
    }

    async fn finalize(&self) -> Result<(), CoreError> {
        if let Err(e) = self.comm.stop().await {
            error!(module = self.name(), error = %e, "daemon comm failed to stop");
        }
        self.launcher.disconnect().await;
        debug!(module = self.name(), "launch module finalized");
        Ok(())
    }
}
