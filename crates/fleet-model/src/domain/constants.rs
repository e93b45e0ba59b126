//! Well-known attribute keys and environment variable names.
//!
//! Daemons and the launcher agree on these names; keeping them here avoids scattering magic strings.

/// Node attribute holding the backend-specific launch target id (`Int32`).
pub const ATTR_LAUNCH_ID: &str = "fleet.node.launchId";

/// Selects the launch mechanism a daemon uses for any further spawning.
pub const ENV_PLM: &str = "FLEET_MCA_plm";

/// Value of [`ENV_PLM`] forcing the direct (non-recursive) launch mechanism.
pub const PLM_DIRECT: &str = "direct";

/// Octal umask of the launcher, re-applied by daemons on start-up.
pub const ENV_DAEMON_UMASK: &str = "FLEET_DAEMON_UMASK_VALUE";

/// Launch target id a spawned daemon was started for.
pub const ENV_LAUNCH_ID: &str = "FLEET_LAUNCH_ID";

/// Job whose launch started the daemon.
pub const ENV_JOB_NSPACE: &str = "FLEET_JOB_NSPACE";

/// Tool-attach variables that must not leak into daemon environments.
pub const ENV_LAUNCHER_PAUSE_FOR_TOOL: &str = "FLEET_LAUNCHER_PAUSE_FOR_TOOL";
pub const ENV_LAUNCHER_RENDEZVOUS_FILE: &str = "FLEET_LAUNCHER_RENDEZVOUS_FILE";

pub const ENV_PATH: &str = "PATH";
pub const ENV_LIBRARY_PATH: &str = "LD_LIBRARY_PATH";
