use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    backend::SpawnBackend,
    launch::DaemonLauncher,
    state::{HandlerContext, StateHandler},
};

/// Binds [`DaemonLauncher::launch_daemons`] to a state.
pub struct LaunchDaemons<B: SpawnBackend>(pub Arc<DaemonLauncher<B>>);

#[async_trait]
impl<B: SpawnBackend> StateHandler for LaunchDaemons<B> {
    fn name(&self) -> &'static str {
        "launch-daemons"
    }

    async fn handle(&self, cx: &mut HandlerContext<'_>) {
        self.0.launch_daemons(cx).await
    }
}

/// Binds [`DaemonLauncher::poll_spawns`] to a state.
pub struct PollSpawns<B: SpawnBackend>(pub Arc<DaemonLauncher<B>>);

#[async_trait]
impl<B: SpawnBackend> StateHandler for PollSpawns<B> {
    fn name(&self) -> &'static str {
        "poll-spawns"
    }

    async fn handle(&self, cx: &mut HandlerContext<'_>) {
        self.0.poll_spawns(cx).await
    }
}

/// Binds [`DaemonLauncher::discard`] to a state, so a failed job leaves no spawns behind.
pub struct DiscardSpawns<B: SpawnBackend>(pub Arc<DaemonLauncher<B>>);

#[async_trait]
impl<B: SpawnBackend> StateHandler for DiscardSpawns<B> {
    fn name(&self) -> &'static str {
        "discard-spawns"
    }

    async fn handle(&self, cx: &mut HandlerContext<'_>) {
        self.0.discard(cx.nspace());
    }
}
