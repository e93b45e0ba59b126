use crate::metrics::backend::{LaunchOutcome, MetricsBackend};

/// Metrics backend that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_daemons_spawned(&self, _: &str, _: u64) {}

    #[inline(always)]
    fn record_launch_completed(&self, _: &str, _: LaunchOutcome, _: u64) {}

    #[inline(always)]
    fn record_backend_error(&self, _: &str, _: &str) {}
}
