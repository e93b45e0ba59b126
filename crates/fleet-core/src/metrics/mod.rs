//! Metrics collection abstraction for daemon launches.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are injected via [`crate::LaunchContext`].
mod backend;
pub use backend::{LaunchOutcome, MetricsBackend, MetricsHandle};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
