use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use fleet_core::{LaunchOutcome, MetricsBackend};

const NAMESPACE: &str = "fleet";

/// [`MetricsBackend`] exporting launch metrics to a prometheus registry.
///
/// Label values are bounded: backend names, the three launch outcomes and error kinds.
#[derive(Clone)]
pub struct PrometheusMetrics {
    daemons_spawned: CounterVec,
    launches: CounterVec,
    launch_duration: HistogramVec,
    backend_errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let daemons_spawned = CounterVec::new(
            Opts::new("daemons_spawned_total", "Daemons handed to the spawn backend")
                .namespace(NAMESPACE),
            &["backend"],
        )?;
        registry.register(Box::new(daemons_spawned.clone()))?;

        let launches = CounterVec::new(
            Opts::new("launches_total", "Launch-daemons passes by outcome").namespace(NAMESPACE),
            &["backend", "outcome"],
        )?;
        registry.register(Box::new(launches.clone()))?;

        let launch_duration = HistogramVec::new(
            HistogramOpts::new(
                "launch_duration_seconds",
                "Time from entering launch-daemons to the launch outcome",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]),
            &["backend"],
        )?;
        registry.register(Box::new(launch_duration.clone()))?;

        let backend_errors = CounterVec::new(
            Opts::new("backend_errors_total", "Backend-level launch errors").namespace(NAMESPACE),
            &["backend", "error_kind"],
        )?;
        registry.register(Box::new(backend_errors.clone()))?;

        Ok(Self {
            daemons_spawned,
            launches,
            launch_duration,
            backend_errors,
            registry,
        })
    }

    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render every metric in the prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_daemons_spawned(&self, backend: &str, count: u64) {
        self.daemons_spawned
            .with_label_values(&[backend])
            .inc_by(count as f64);
    }

    fn record_launch_completed(&self, backend: &str, outcome: LaunchOutcome, duration_ms: u64) {
        self.launches
            .with_label_values(&[backend, outcome.as_label()])
            .inc();
        self.launch_duration
            .with_label_values(&[backend])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_backend_error(&self, backend: &str, error_kind: &str) {
        self.backend_errors
            .with_label_values(&[backend, error_kind])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.name() == name)
            .unwrap_or_else(|| panic!("metric {name} not found"))
    }

    #[test]
    fn daemons_spawned_adds_count() {
        let m = PrometheusMetrics::new().unwrap();
        m.record_daemons_spawned("local", 3);
        m.record_daemons_spawned("local", 2);

        let families = m.gather();
        let f = family(&families, "fleet_daemons_spawned_total");
        assert_eq!(f.get_metric().len(), 1);
        assert_eq!(f.get_metric()[0].get_counter().value(), 5.0);
    }

    #[test]
    fn launches_are_split_by_outcome() {
        let m = PrometheusMetrics::new().unwrap();
        m.record_launch_completed("local", LaunchOutcome::Launched, 120);
        m.record_launch_completed("local", LaunchOutcome::Failed, 10);
        m.record_launch_completed("local", LaunchOutcome::Failed, 15);

        let families = m.gather();
        assert_eq!(family(&families, "fleet_launches_total").get_metric().len(), 2);
        assert_eq!(
            family(&families, "fleet_launch_duration_seconds").get_metric().len(),
            1
        );
    }

    #[test]
    fn backend_errors_by_kind() {
        let m = PrometheusMetrics::new().unwrap();
        m.record_backend_error("local", "resource_busy");
        m.record_backend_error("local", "spawn_failed");

        let families = m.gather();
        assert_eq!(family(&families, "fleet_backend_errors_total").get_metric().len(), 2);
    }

    #[test]
    fn text_encoding_lists_metrics() {
        let m = PrometheusMetrics::new().unwrap();
        m.record_daemons_spawned("local", 1);
        let text = m.encode_text().unwrap();
        assert!(text.contains("fleet_daemons_spawned_total{backend=\"local\"} 1"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = Arc::new(Registry::new());
        PrometheusMetrics::new_with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}
