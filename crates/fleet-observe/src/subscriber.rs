//! Job state logging for the launch state machine.
use async_trait::async_trait;
use tracing::{debug, error, info};

use fleet_core::{StateEvent, Subscribe};
use fleet_model::JobState;

/// Logs every applied job transition. Failures are logged at error level with their reason.
#[derive(Debug, Default)]
pub struct StateLogger;

#[async_trait]
impl Subscribe for StateLogger {
    async fn on_event(&self, e: &StateEvent) {
        log_event(e);
    }

    fn name(&self) -> &'static str {
        "state-logger"
    }
}

fn log_event(e: &StateEvent) {
    let msg = message_for(e.state);
    match e.state {
        JobState::FailedToStart => error!(
            nspace = %e.nspace,
            from = %e.previous,
            reason = e.reason.as_deref().unwrap_or("unknown"),
            "{msg}"
        ),
        JobState::DaemonsLaunched | JobState::DaemonsReported => {
            info!(nspace = %e.nspace, from = %e.previous, "{msg}")
        }
        _ => debug!(nspace = %e.nspace, from = %e.previous, to = %e.state, "{msg}"),
    }
}

#[inline]
fn message_for(state: JobState) -> &'static str {
    match state {
        JobState::Undef => "job state reset",
        JobState::Init => "job accepted",
        JobState::Map => "mapping job",
        JobState::LaunchDaemons => "launching daemons",
        JobState::DaemonsLaunched => "daemons launched",
        JobState::DaemonsReported => "daemons reported",
        JobState::FailedToStart => "job failed to start",
    }
}

#[cfg(test)]
mod tests {
    use fleet_model::Nspace;

    use super::*;

    #[test]
    fn every_state_has_a_message() {
        for s in [
            JobState::Undef,
            JobState::Init,
            JobState::Map,
            JobState::LaunchDaemons,
            JobState::DaemonsLaunched,
            JobState::DaemonsReported,
            JobState::FailedToStart,
        ] {
            assert!(!message_for(s).is_empty());
        }
    }

    #[tokio::test]
    async fn logs_failure_without_reason() {
        let e = StateEvent {
            nspace: Nspace::new("app@1"),
            previous: JobState::LaunchDaemons,
            state: JobState::FailedToStart,
            reason: None,
        };
        StateLogger.on_event(&e).await;
    }
}
