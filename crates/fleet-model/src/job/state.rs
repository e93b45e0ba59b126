use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Lifecycle states of a job, in the order a launch moves through them.
///
/// Ordering is meaningful: a job only moves forward, except that a restart re-enters at [`JobState::Map`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum JobState {
    #[default]
    Undef,
    Init,
    Map,
    LaunchDaemons,
    DaemonsLaunched,
    DaemonsReported,
    FailedToStart,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Undef => "undef",
            JobState::Init => "init",
            JobState::Map => "map",
            JobState::LaunchDaemons => "launch-daemons",
            JobState::DaemonsLaunched => "daemons-launched",
            JobState::DaemonsReported => "daemons-reported",
            JobState::FailedToStart => "failed-to-start",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::FailedToStart)
    }

    /// Whether a job currently in `self` may enter `next`.
    ///
    /// Rules:
    /// - nothing leaves a terminal state;
    /// - the failure state is always reachable;
    /// - restarting jobs may re-enter at `Map`;
    /// - otherwise states never go backwards.
    pub fn may_enter(&self, next: JobState, restart: bool) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobState::FailedToStart {
            return true;
        }
        if restart && next == JobState::Map {
            return true;
        }
        next >= *self
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "undef" => Ok(JobState::Undef),
            "init" => Ok(JobState::Init),
            "map" => Ok(JobState::Map),
            "launch-daemons" => Ok(JobState::LaunchDaemons),
            "daemons-launched" => Ok(JobState::DaemonsLaunched),
            "daemons-reported" => Ok(JobState::DaemonsReported),
            "failed-to-start" => Ok(JobState::FailedToStart),
            other => Err(ModelError::UnknownState(other.to_string())),
        }
    }
}
