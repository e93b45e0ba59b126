use async_trait::async_trait;

use fleet_model::{JobState, Nspace};

/// A state change applied by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEvent {
    pub nspace: Nspace,
    pub previous: JobState,
    pub state: JobState,
    pub reason: Option<String>,
}

/// Observer notified after every applied transition, before the state's handler runs.
#[async_trait]
pub trait Subscribe: Send + Sync {
    async fn on_event(&self, event: &StateEvent);

    fn name(&self) -> &'static str;
}
