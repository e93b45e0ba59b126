//! Job state machine: per-state handlers driven by a single activation queue.
//!
//! Activations are processed one at a time, in FIFO order, by whoever owns the [`StateMachine`].
//! Other tasks and threads enqueue through an [`Activator`].
mod activation;
pub use activation::{Activation, Activator};

mod handler;
pub use handler::{AwaitDaemons, Forward, HandlerContext, StateHandler};

mod subscriber;
pub use subscriber::{StateEvent, Subscribe};

use std::{collections::HashMap, sync::Arc};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use fleet_model::{Job, JobRegistry, JobState};

pub struct StateMachine {
    handlers: HashMap<JobState, Arc<dyn StateHandler>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    jobs: JobRegistry,
    tx: mpsc::UnboundedSender<Activation>,
    rx: mpsc::UnboundedReceiver<Activation>,
}

impl StateMachine {
    /// Create a machine with no handlers bound.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handlers: HashMap::new(),
            subscribers: Vec::new(),
            jobs: JobRegistry::new(),
            tx,
            rx,
        }
    }

    /// Create a machine with the stock bindings: `Init` and `Map` forward,
    /// `DaemonsLaunched` waits. `LaunchDaemons` stays unbound until a launch module registers it.
    pub fn with_defaults() -> Self {
        let mut sm = Self::new();
        sm.set_handler(JobState::Init, Arc::new(Forward::new(JobState::Map)));
        sm.set_handler(JobState::Map, Arc::new(Forward::new(JobState::LaunchDaemons)));
        sm.set_handler(JobState::DaemonsLaunched, Arc::new(AwaitDaemons));
        sm
    }

    /// Bind `handler` to `state`, returning the handler it replaced.
    pub fn set_handler(
        &mut self,
        state: JobState,
        handler: Arc<dyn StateHandler>,
    ) -> Option<Arc<dyn StateHandler>> {
        let prev = self.handlers.insert(state, handler);
        if let Some(p) = &prev {
            debug!(state = %state, replaced = p.name(), "state handler replaced");
        }
        prev
    }

    pub fn handler(&self, state: JobState) -> Option<&Arc<dyn StateHandler>> {
        self.handlers.get(&state)
    }

    pub fn add_subscriber(&mut self, subscriber: Arc<dyn Subscribe>) {
        self.subscribers.push(subscriber);
    }

    pub fn activator(&self) -> Activator {
        Activator::new(self.tx.clone())
    }

    pub fn jobs(&self) -> &JobRegistry {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut JobRegistry {
        &mut self.jobs
    }

    /// Register a job without activating anything.
    pub fn submit(&mut self, job: Job) {
        self.jobs.insert(job);
    }

    /// Apply one activation: move the job, notify subscribers, run the bound handler
    /// and enqueue whatever it asked for.
    ///
    /// Activations for unknown jobs, and transitions [`JobState::may_enter`] forbids, are dropped.
    pub async fn dispatch(&mut self, activation: Activation) {
        let Activation {
            nspace,
            state,
            reason,
        } = activation;

        let Some(job) = self.jobs.get_mut(&nspace) else {
            warn!(nspace = %nspace, state = %state, "activation for unknown job dropped");
            return;
        };
        let previous = job.state;
        if !previous.may_enter(state, job.flags.restart.is_enabled()) {
            warn!(nspace = %nspace, from = %previous, to = %state, "illegal transition dropped");
            return;
        }
        job.state = state;
        if let Some(r) = &reason {
            job.failure = Some(r.clone());
        }
        trace!(nspace = %nspace, from = %previous, to = %state, "job state applied");

        let event = StateEvent {
            nspace: nspace.clone(),
            previous,
            state,
            reason,
        };
        for sub in &self.subscribers {
            sub.on_event(&event).await;
        }

        let Some(handler) = self.handlers.get(&state).cloned() else {
            return;
        };
        let mut cx = HandlerContext::new(nspace, state, &mut self.jobs);
        handler.handle(&mut cx).await;

        for next in cx.into_activations() {
            // The machine owns the receiver, so the channel cannot be closed here.
            let _ = self.tx.send(next);
        }
    }

    /// Drain the queue, including activations produced while draining. Returns how many were processed.
    pub async fn run_until_idle(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(next) = self.rx.try_recv() {
            self.dispatch(next).await;
            processed += 1;
        }
        processed
    }

    /// Process activations as they arrive until `cancel` fires.
    pub async fn run(&mut self, cancel: CancellationToken) {
        debug!("state machine started");
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = self.rx.recv() => next,
            };
            let Some(next) = next else {
                break;
            };
            self.dispatch(next).await;
        }
        debug!("state machine stopped");
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use fleet_model::{JobFlags, Nspace};

    use super::*;

    struct Recorder {
        seen: Arc<Mutex<Vec<&'static str>>>,
        tag: &'static str,
    }

    #[async_trait]
    impl StateHandler for Recorder {
        fn name(&self) -> &'static str {
            self.tag
        }

        async fn handle(&self, _cx: &mut HandlerContext<'_>) {
            self.seen.lock().unwrap().push(self.tag);
        }
    }

    struct Events(Mutex<Vec<StateEvent>>);

    #[async_trait]
    impl Subscribe for Events {
        async fn on_event(&self, event: &StateEvent) {
            self.0.lock().unwrap().push(event.clone());
        }

        fn name(&self) -> &'static str {
            "events"
        }
    }

    fn machine_with(job: Job) -> StateMachine {
        let mut sm = StateMachine::with_defaults();
        sm.submit(job);
        sm
    }

    #[tokio::test]
    async fn defaults_walk_init_to_launch_daemons() {
        let ns = Nspace::new("app@1");
        let mut sm = machine_with(Job::new(ns.clone()));
        sm.activator().activate(ns.clone(), JobState::Init).unwrap();

        assert_eq!(sm.run_until_idle().await, 3);
        assert_eq!(sm.jobs().get(&ns).unwrap().state, JobState::LaunchDaemons);
    }

    #[tokio::test]
    async fn set_handler_overwrites_previous_binding() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ns = Nspace::new("app@1");
        let mut sm = machine_with(Job::new(ns.clone()));

        sm.set_handler(
            JobState::LaunchDaemons,
            Arc::new(Recorder { seen: seen.clone(), tag: "first" }),
        );
        let replaced = sm.set_handler(
            JobState::LaunchDaemons,
            Arc::new(Recorder { seen: seen.clone(), tag: "second" }),
        );
        assert_eq!(replaced.map(|h| h.name()), Some("first"));

        sm.activator().activate(ns, JobState::LaunchDaemons).unwrap();
        sm.run_until_idle().await;

        assert_eq!(*seen.lock().unwrap(), vec!["second"]);
    }

    #[tokio::test]
    async fn backward_transition_is_dropped() {
        let ns = Nspace::new("app@1");
        let mut job = Job::new(ns.clone());
        job.state = JobState::DaemonsLaunched;
        let mut sm = machine_with(job);

        sm.activator().activate(ns.clone(), JobState::Map).unwrap();
        sm.run_until_idle().await;

        assert_eq!(sm.jobs().get(&ns).unwrap().state, JobState::DaemonsLaunched);
    }

    #[tokio::test]
    async fn restarting_job_may_reenter_map() {
        let ns = Nspace::new("app@1");
        let mut job = Job::new(ns.clone()).with_flags(JobFlags {
            restart: true.into(),
            ..Default::default()
        });
        job.state = JobState::DaemonsReported;
        let mut sm = StateMachine::new();
        sm.submit(job);

        sm.activator().activate(ns.clone(), JobState::Map).unwrap();
        sm.run_until_idle().await;

        assert_eq!(sm.jobs().get(&ns).unwrap().state, JobState::Map);
    }

    #[tokio::test]
    async fn failure_is_terminal_and_records_reason() {
        let ns = Nspace::new("app@1");
        let mut sm = machine_with(Job::new(ns.clone()));
        let act = sm.activator();

        act.send(Activation::new(ns.clone(), JobState::FailedToStart).with_reason("node down"))
            .unwrap();
        act.activate(ns.clone(), JobState::Init).unwrap();
        sm.run_until_idle().await;

        let job = sm.jobs().get(&ns).unwrap();
        assert_eq!(job.state, JobState::FailedToStart);
        assert_eq!(job.failure.as_deref(), Some("node down"));
    }

    #[tokio::test]
    async fn unknown_job_is_ignored() {
        let mut sm = StateMachine::with_defaults();
        sm.activator()
            .activate(Nspace::new("ghost@9"), JobState::Init)
            .unwrap();

        assert_eq!(sm.run_until_idle().await, 1);
        assert!(sm.jobs().is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_every_applied_transition() {
        let ns = Nspace::new("app@1");
        let mut sm = machine_with(Job::new(ns.clone()));
        let events = Arc::new(Events(Mutex::new(Vec::new())));
        sm.add_subscriber(events.clone());

        sm.activator().activate(ns, JobState::Init).unwrap();
        sm.run_until_idle().await;

        let seen: Vec<(JobState, JobState)> = events
            .0
            .lock()
            .unwrap()
            .iter()
            .map(|e| (e.previous, e.state))
            .collect();
        assert_eq!(
            seen,
            vec![
                (JobState::Undef, JobState::Init),
                (JobState::Init, JobState::Map),
                (JobState::Map, JobState::LaunchDaemons),
            ]
        );
    }

    #[tokio::test]
    async fn activations_from_other_threads_are_processed_in_order() {
        let ns = Nspace::new("app@1");
        let mut sm = StateMachine::new();
        sm.submit(Job::new(ns.clone()));
        let events = Arc::new(Events(Mutex::new(Vec::new())));
        sm.add_subscriber(events.clone());

        let act = sm.activator();
        let ns2 = ns.clone();
        std::thread::spawn(move || {
            act.activate(ns2.clone(), JobState::Init).unwrap();
            act.activate(ns2, JobState::Map).unwrap();
        })
        .join()
        .unwrap();

        sm.run_until_idle().await;

        let states: Vec<JobState> = events.0.lock().unwrap().iter().map(|e| e.state).collect();
        assert_eq!(states, vec![JobState::Init, JobState::Map]);
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let ns = Nspace::new("app@1");
        let mut sm = machine_with(Job::new(ns.clone()));
        sm.activator().activate(ns.clone(), JobState::Init).unwrap();

        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            stop.cancel();
        });

        sm.run(cancel).await;
        assert_eq!(sm.jobs().get(&ns).unwrap().state, JobState::LaunchDaemons);
    }
}
