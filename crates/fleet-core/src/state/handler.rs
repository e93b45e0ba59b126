use async_trait::async_trait;
use tracing::trace;

use fleet_model::{Job, JobRegistry, JobState, Nspace};

use super::Activation;

/// Mutable view handed to a state handler: the job registry plus an outbox of follow-up activations.
///
/// Activations pushed here are enqueued by the state machine after the handler returns,
/// in the order they were pushed.
pub struct HandlerContext<'a> {
    nspace: Nspace,
    state: JobState,
    jobs: &'a mut JobRegistry,
    outbox: Vec<Activation>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(nspace: Nspace, state: JobState, jobs: &'a mut JobRegistry) -> Self {
        Self {
            nspace,
            state,
            jobs,
            outbox: Vec::new(),
        }
    }

    /// Namespace of the job being handled.
    pub fn nspace(&self) -> &Nspace {
        &self.nspace
    }

    /// State that triggered the handler.
    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn jobs(&self) -> &JobRegistry {
        self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut JobRegistry {
        self.jobs
    }

    /// The job being handled.
    pub fn job(&self) -> Option<&Job> {
        self.jobs.get(&self.nspace)
    }

    pub fn job_mut(&mut self) -> Option<&mut Job> {
        self.jobs.get_mut(&self.nspace)
    }

    /// Queue `state` for `nspace`.
    pub fn activate(&mut self, nspace: Nspace, state: JobState) {
        self.outbox.push(Activation::new(nspace, state));
    }

    /// Queue the failure state for `nspace`, recording `reason` on the job.
    pub fn escalate(&mut self, nspace: Nspace, reason: impl Into<String>) {
        self.outbox
            .push(Activation::new(nspace, JobState::FailedToStart).with_reason(reason));
    }

    pub fn activations(&self) -> &[Activation] {
        &self.outbox
    }

    pub fn into_activations(self) -> Vec<Activation> {
        self.outbox
    }
}

/// Behavior bound to one job state.
#[async_trait]
pub trait StateHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, cx: &mut HandlerContext<'_>);
}

/// Moves the job straight on to the next state.
#[derive(Debug, Clone, Copy)]
pub struct Forward {
    to: JobState,
}

impl Forward {
    pub fn new(to: JobState) -> Self {
        Self { to }
    }
}

#[async_trait]
impl StateHandler for Forward {
    fn name(&self) -> &'static str {
        "forward"
    }

    async fn handle(&self, cx: &mut HandlerContext<'_>) {
        trace!(nspace = %cx.nspace(), from = %cx.state(), to = %self.to, "forwarding job");
        let nspace = cx.nspace().clone();
        cx.activate(nspace, self.to);
    }
}

/// Leaves the job where it is until daemons report in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwaitDaemons;

#[async_trait]
impl StateHandler for AwaitDaemons {
    fn name(&self) -> &'static str {
        "await-daemons"
    }

    async fn handle(&self, cx: &mut HandlerContext<'_>) {
        trace!(nspace = %cx.nspace(), "waiting for daemons to report");
    }
}
