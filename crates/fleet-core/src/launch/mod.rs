//! Daemon launch orchestration over a [`SpawnBackend`].
//!
//! One pass of the launch-daemons state:
//! - skips jobs that need no new daemons (debugger daemons, dry runs, nothing new mapped);
//! - builds the daemon command line and environment once;
//! - connects to the backend, retrying a bounded number of times;
//! - spawns one daemon per node that does not already run one, in map order;
//! - on the first failure escalates the user job to `FailedToStart`; nothing is rolled back;
//! - on success marks the daemon job launched and moves the user job on.
//!
//! Backends that need spawns confirmed keep a [`LaunchSession`] per job until the poll step runs.
mod command;
pub use command::{DaemonArgv, DaemonCommand, DefaultDaemonCommand, daemon_name};

mod env;
pub use env::daemon_env;

mod handlers;
pub use handlers::{DiscardSpawns, LaunchDaemons, PollSpawns};

mod plm;
pub use plm::PlmModule;


use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, instrument, trace, warn};

use fleet_model::{ENV_JOB_NSPACE, JobState, Nspace};

use crate::{
    backend::{BackendError, SpawnBackend, SpawnHandle, SpawnStatus},
    config::LaunchConfig,
    context::LaunchContext,
    error::CoreError,
    metrics::LaunchOutcome,
    state::HandlerContext,
    vm::{StaticVirtualMachine, VirtualMachine},
};

/// Spawns issued for one job and not yet confirmed.
#[derive(Debug, Default)]
pub struct LaunchSession {
    spawns: Vec<(String, SpawnHandle)>,
    started: Option<Instant>,
}

impl LaunchSession {
    /// Number of spawns launched so far.
    pub fn launched(&self) -> usize {
        self.spawns.len()
    }
}

pub struct DaemonLauncher<B: SpawnBackend> {
    backend: Arc<B>,
    config: LaunchConfig,
    ctx: LaunchContext,
    vm: Arc<dyn VirtualMachine>,
    command: Arc<dyn DaemonCommand>,
    connected: AsyncMutex<bool>,
    sessions: Mutex<HashMap<Nspace, LaunchSession>>,
}

impl<B: SpawnBackend> DaemonLauncher<B> {
    pub fn new(backend: Arc<B>, config: LaunchConfig, ctx: LaunchContext) -> Self {
        let command = Arc::new(DefaultDaemonCommand::from_config(&config));
        Self {
            backend,
            config,
            ctx,
            vm: Arc::new(StaticVirtualMachine),
            command,
            connected: AsyncMutex::new(false),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_vm(mut self, vm: Arc<dyn VirtualMachine>) -> Self {
        self.vm = vm;
        self
    }

    pub fn with_command(mut self, command: Arc<dyn DaemonCommand>) -> Self {
        self.command = command;
        self
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub async fn is_connected(&self) -> bool {
        *self.connected.lock().await
    }

    /// Spawns awaiting confirmation for `nspace`.
    pub fn pending(&self, nspace: &Nspace) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(nspace)
            .map_or(0, LaunchSession::launched)
    }

    /// Drop the spawns recorded for `nspace`. Returns how many were awaiting confirmation.
    pub fn discard(&self, nspace: &Nspace) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(nspace)
            .map_or(0, |s| s.launched())
    }

    /// Forget sessions whose poll step can no longer run: the job is gone, or it left
    /// `LaunchDaemons` without its `DaemonsLaunched` activation being applied.
    fn prune_sessions(&self, cx: &HandlerContext<'_>) {
        let current = cx.nspace();
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|ns, _| {
                let live = ns != current
                    && cx
                        .jobs()
                        .get(ns)
                        .is_some_and(|j| j.state == JobState::LaunchDaemons);
                if !live {
                    debug!(stale = %ns, "dropping unconfirmed spawns");
                }
                live
            });
    }

    /// Run one launch-daemons pass for the job in `cx`.
    #[instrument(level = "debug", skip_all, fields(nspace = %cx.nspace(), backend = self.backend.name()))]
    pub async fn launch_daemons(&self, cx: &mut HandlerContext<'_>) {
        self.prune_sessions(cx);
        let started = Instant::now();
        let nspace = cx.nspace().clone();
        let backend = self.backend.name();

        match self.try_launch(cx, started).await {
            Ok(LaunchOutcome::Failed) => {}
            Ok(LaunchOutcome::Skipped) => {
                debug!("no daemons to launch");
                self.record(LaunchOutcome::Skipped, started);
            }
            Ok(LaunchOutcome::Launched) => {
                if !self.backend.requires_poll() {
                    self.record(LaunchOutcome::Launched, started);
                }
            }
            Err(e) => {
                error!(error = %e, "daemon launch failed");
                self.ctx.metrics().record_backend_error(backend, e.kind());
                self.record(LaunchOutcome::Failed, started);
                cx.escalate(nspace, e.to_string());
            }
        }
    }

    async fn try_launch(
        &self,
        cx: &mut HandlerContext<'_>,
        started: Instant,
    ) -> Result<LaunchOutcome, CoreError> {
        let nspace = cx.nspace().clone();
        let job = cx
            .job()
            .ok_or_else(|| CoreError::NotFound(format!("job {nspace}")))?;

        if job.flags.debugger_daemon.is_enabled() {
            debug!("debugger daemons attach to existing daemons");
            skip_launch(cx);
            return Ok(LaunchOutcome::Skipped);
        }
        let app = job.apps.first().cloned();
        let job_dry_run = job.flags.do_not_launch.is_enabled();

        self.vm.setup(cx.jobs_mut(), &nspace)?;

        let daemons = cx
            .jobs()
            .daemons()
            .ok_or_else(|| CoreError::NotFound("daemon job".into()))?;
        let daemons_ns = daemons.nspace.clone();
        let map = daemons
            .map
            .as_ref()
            .ok_or_else(|| CoreError::NotFound("daemon map".into()))?;

        if job_dry_run || daemons.flags.do_not_launch.is_enabled() {
            debug!("dry run requested");
            skip_launch(cx);
            return Ok(LaunchOutcome::Skipped);
        }
        if map.num_new_daemons() == 0 {
            skip_launch(cx);
            return Ok(LaunchOutcome::Skipped);
        }

        let mut argv = self.command.build(self.backend.name(), &daemons_ns);
        debug!(argv = %argv.argv().join(" "), "final top-level argv");

        self.ensure_connected().await?;

        let mut env = daemon_env(self.ctx.env(), &self.config, app.as_ref(), self.ctx.umask());
        env.set(ENV_JOB_NSPACE, nspace.to_string());

        let map = cx
            .jobs_mut()
            .daemons_mut()
            .and_then(|d| d.map.as_mut())
            .ok_or_else(|| CoreError::NotFound("daemon map".into()))?;

        let mut session = LaunchSession {
            spawns: Vec::with_capacity(map.num_new_daemons()),
            started: Some(started),
        };
        for node in map.nodes_mut() {
            if node.daemon_launched() {
                trace!(node = %node.name, "daemon already running");
                continue;
            }
            let rank = node
                .daemon
                .as_ref()
                .map(|d| d.rank)
                .ok_or_else(|| CoreError::MissingDaemon {
                    node: node.name.clone(),
                })?;
            argv.set_rank(rank);

            let launch_id = node
                .launch_id()
                .ok_or_else(|| CoreError::MissingLaunchTarget {
                    node: node.name.clone(),
                })?;

            let handle = self
                .backend
                .spawn(argv.argv(), &env, launch_id)
                .await
                .map_err(|source| CoreError::Spawn {
                    program: argv.program().to_string(),
                    node: node.name.clone(),
                    launch_id,
                    source,
                })?;
            trace!(node = %node.name, launch_id, rank = %rank, "daemon spawned");
            node.flags.daemon_launched.set();
            session.spawns.push((node.name.clone(), handle));
        }

        let launched = session.launched();
        self.ctx
            .metrics()
            .record_daemons_spawned(self.backend.name(), launched as u64);
        debug!(launched, "launch complete");

        if let Some(daemons) = cx.jobs_mut().daemons_mut() {
            daemons.state = JobState::DaemonsLaunched;
        }
        if self.backend.requires_poll() {
            self.sessions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(nspace.clone(), session);
        }
        cx.activate(nspace, JobState::DaemonsLaunched);
        Ok(LaunchOutcome::Launched)
    }

    /// Confirm every spawn recorded for the job in `cx`.
    #[instrument(level = "debug", skip_all, fields(nspace = %cx.nspace(), backend = self.backend.name()))]
    pub async fn poll_spawns(&self, cx: &mut HandlerContext<'_>) {
        let nspace = cx.nspace().clone();
        let session = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&nspace);
        let Some(session) = session else {
            trace!("no spawns to confirm");
            return;
        };
        let started = session.started.unwrap_or_else(Instant::now);

        match self.try_poll(&session).await {
            Ok(()) => {
                debug!(confirmed = session.launched(), "all daemons started");
                self.record(LaunchOutcome::Launched, started);
            }
            Err(e) => {
                error!(error = %e, "daemon failed to start");
                self.ctx
                    .metrics()
                    .record_backend_error(self.backend.name(), e.kind());
                self.record(LaunchOutcome::Failed, started);
                cx.escalate(nspace, e.to_string());
            }
        }
    }

    async fn try_poll(&self, session: &LaunchSession) -> Result<(), CoreError> {
        for (node, handle) in &session.spawns {
            let status = match self.config.poll_timeout() {
                Some(limit) => tokio::time::timeout(limit, self.backend.poll(handle))
                    .await
                    .unwrap_or(Err(BackendError::Timeout(limit.as_millis() as u64))),
                None => self.backend.poll(handle).await,
            };
            match status {
                Ok(SpawnStatus::Started) => {
                    trace!(node = %node, launch_id = handle.launch_id(), "daemon confirmed");
                }
                Ok(SpawnStatus::Failed { code }) => {
                    return Err(CoreError::SpawnFailed {
                        node: node.clone(),
                        launch_id: handle.launch_id(),
                        code,
                    });
                }
                Err(source) => {
                    return Err(CoreError::Poll {
                        node: node.clone(),
                        launch_id: handle.launch_id(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Connect once per launcher; later passes reuse the session.
    async fn ensure_connected(&self) -> Result<(), CoreError> {
        let mut connected = self.connected.lock().await;
        if *connected {
            return Ok(());
        }

        let backend = self.backend.name();
        let attempts = self.config.connect_attempts.max(1);
        let delay = self.config.connect_retry_delay();
        for attempt in 1..=attempts {
            match self.backend.connect().await {
                Ok(()) => {
                    debug!(attempt, "connected to backend");
                    *connected = true;
                    return Ok(());
                }
                Err(e) => {
                    trace!(attempt, error = %e, "connect attempt failed");
                    if attempt < attempts {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        tokio::task::yield_now().await;
                    }
                }
            }
        }
        Err(CoreError::ResourceBusy { backend, attempts })
    }

    /// Close the backend session if one is open.
    pub async fn disconnect(&self) {
        let mut connected = self.connected.lock().await;
        if !*connected {
            return;
        }
        if let Err(e) = self.backend.disconnect().await {
            warn!(backend = self.backend.name(), error = %e, "backend disconnect failed");
        }
        *connected = false;
    }

    fn record(&self, outcome: LaunchOutcome, started: Instant) {
        self.ctx.metrics().record_launch_completed(
            self.backend.name(),
            outcome,
            started.elapsed().as_millis() as u64,
        );
    }
}

/// Nothing to spawn: the job counts as launched and its daemons as reported.
fn skip_launch(cx: &mut HandlerContext<'_>) {
    let nspace = cx.nspace().clone();
    if let Some(job) = cx.job_mut() {
        job.state = JobState::DaemonsLaunched;
    }
    cx.activate(nspace, JobState::DaemonsReported);
}
