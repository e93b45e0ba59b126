use std::fmt;

use fleet_model::Env;

use crate::metrics::MetricsHandle;

/// Process-level inputs shared by every launch: the launch environment, the creation mask and metrics.
#[derive(Clone)]
pub struct LaunchContext {
    env: Env,
    umask: Option<u32>,
    metrics: MetricsHandle,
}

impl LaunchContext {
    pub fn new(env: Env, metrics: MetricsHandle) -> Self {
        Self {
            env,
            umask: None,
            metrics,
        }
    }

    /// Capture the current process environment and file creation mask.
    pub fn from_process(metrics: MetricsHandle) -> Self {
        Self {
            env: Env::from_process(),
            umask: current_umask(),
            metrics,
        }
    }

    /// Environment daemons inherit before launch-specific rewrites.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// File creation mask propagated to daemons.
    pub fn umask(&self) -> Option<u32> {
        self.umask
    }

    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn with_umask(mut self, umask: u32) -> Self {
        self.umask = Some(umask);
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Default for LaunchContext {
    fn default() -> Self {
        Self {
            env: Env::default(),
            umask: None,
            metrics: crate::metrics::noop_metrics(),
        }
    }
}

impl fmt::Debug for LaunchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchContext")
            .field("env_len", &self.env.len())
            .field("umask", &self.umask)
            .field("metrics", &"<handle>")
            .finish()
    }
}

/// Read the process file creation mask.
///
/// Prefers `/proc/self/status` so the mask is never changed; elsewhere it is
/// read by setting it to zero and restoring it immediately.
#[cfg(unix)]
pub fn current_umask() -> Option<u32> {
    if let Some(mask) = umask_from_proc() {
        return Some(mask);
    }
    // SAFETY: umask has no failure mode; the previous mask is restored right away.
    let mask = unsafe {
        let old = libc::umask(0);
        libc::umask(old);
        old
    };
    Some(mask as u32)
}

#[cfg(not(unix))]
pub fn current_umask() -> Option<u32> {
    None
}

#[cfg(unix)]
fn umask_from_proc() -> Option<u32> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find_map(|l| l.strip_prefix("Umask:"))
        .and_then(|v| u32::from_str_radix(v.trim(), 8).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_has_empty_env_and_no_umask() {
        let ctx = LaunchContext::default();
        assert_eq!(ctx.env().len(), 0);
        assert!(ctx.umask().is_none());
    }

    #[test]
    fn with_env_replaces_existing_env() {
        let mut env1 = Env::new();
        env1.push("FOO", "one");
        let mut env2 = Env::new();
        env2.push("BAR", "two");

        let ctx = LaunchContext::new(env1, crate::metrics::noop_metrics()).with_env(env2);

        assert!(ctx.env().get("FOO").is_none());
        assert_eq!(ctx.env().get("BAR"), Some("two"));
    }

    #[test]
    fn with_metrics_swaps_backend() {
        use std::sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        };

        use crate::metrics::{LaunchOutcome, MetricsBackend};

        #[derive(Default)]
        struct Spawned(AtomicU64);

        impl MetricsBackend for Spawned {
            fn record_daemons_spawned(&self, _: &str, count: u64) {
                self.0.fetch_add(count, Ordering::SeqCst);
            }
            fn record_launch_completed(&self, _: &str, _: LaunchOutcome, _: u64) {}
            fn record_backend_error(&self, _: &str, _: &str) {}
        }

        let spawned = Arc::new(Spawned::default());
        let ctx = LaunchContext::default().with_metrics(spawned.clone());
        ctx.metrics().record_daemons_spawned("local", 4);

        assert_eq!(spawned.0.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn with_umask_sets_mask() {
        let ctx = LaunchContext::default().with_umask(0o027);
        assert_eq!(ctx.umask(), Some(0o027));
    }

    #[cfg(unix)]
    #[test]
    fn current_umask_is_stable() {
        let first = current_umask();
        let second = current_umask();
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
