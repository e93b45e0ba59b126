use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Daemon launch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaunchConfig {
    /// How many times to try connecting to the backend before giving up with `ResourceBusy`.
    pub connect_attempts: u32,
    /// Quiet period between connect attempts, in microseconds. The task always yields in between.
    pub connect_retry_delay_us: u64,
    /// Upper bound for each poll of a spawned daemon. `None` waits as long as the backend does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_timeout_ms: Option<u64>,
    /// Name of the binary directory below an installation prefix.
    pub bin_dir: String,
    /// Name of the library directory below an installation prefix.
    pub lib_dir: String,
    /// Daemon executable.
    pub daemon_program: String,
    /// Extra arguments placed right after the daemon executable.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub daemon_args: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            connect_attempts: 10,
            connect_retry_delay_us: 100,
            poll_timeout_ms: None,
            bin_dir: "bin".into(),
            lib_dir: "lib".into(),
            daemon_program: "fleetd".into(),
            daemon_args: Vec::new(),
        }
    }
}

impl LaunchConfig {
    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_micros(self.connect_retry_delay_us)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_ms.map(Duration::from_millis)
    }
}
